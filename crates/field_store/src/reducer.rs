//! The field store reducer: `(snapshot, intent) -> snapshot'`.
//!
//! The reducer is pure. It never fails: intents it cannot apply leave the
//! snapshot as it was and report a [`StoreDiagnostic`] as the effect of the
//! transition. Malformed payloads never get this far, since they cannot be
//! decoded into a [`FieldIntent`] in the first place.

use std::sync::Arc;

use crate::config::MissingFieldPolicy;
use crate::ids::{FieldId, GroupId};
use crate::intent::{FieldIntent, IntentKind};
use crate::record::{FieldRecord, FieldValue};
use crate::snapshot::Snapshot;
use crate::ui::Validity;

/// Why an intent left the snapshot unchanged.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum StoreDiagnostic {
    #[display(fmt = "unrecognized intent `{}`", kind)]
    UnrecognizedIntent { kind: String },

    #[display(fmt = "`{}` addressed missing field `{}`", kind, field_id)]
    MissingField { kind: IntentKind, field_id: FieldId },

    #[display(fmt = "field `{}` has no group `{}`", field_id, group_id)]
    MissingGroup { field_id: FieldId, group_id: GroupId },

    #[display(fmt = "field `{}` does not hold a group sequence", field_id)]
    NotComplex { field_id: FieldId },

    #[display(fmt = "field `{}` already has a group `{}`", field_id, group_id)]
    DuplicateGroup { field_id: FieldId, group_id: GroupId },
}

/// The result of one reduction: the next snapshot, plus a diagnostic if the
/// intent could not be applied.
pub type Reduction = (Snapshot, Option<StoreDiagnostic>);

/// Anything that can apply an intent to a snapshot.
///
/// Implementations must be pure and deterministic, and must return the input
/// snapshot for intents they do not recognize.
pub trait FieldReducer {
    fn reduce(&self, snapshot: Snapshot, intent: FieldIntent) -> Reduction;
}

impl<F> FieldReducer for F
where
    F: Fn(Snapshot, FieldIntent) -> Reduction,
{
    fn reduce(&self, snapshot: Snapshot, intent: FieldIntent) -> Reduction {
        self(snapshot, intent)
    }
}

/// Apply one intent with the default [`CoreReducer`], discarding the diagnostic.
pub fn apply(snapshot: Snapshot, intent: FieldIntent) -> Snapshot {
    CoreReducer::default().reduce(snapshot, intent).0
}

/// The transition table for every [`IntentKind`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreReducer {
    missing_field: MissingFieldPolicy,
}

impl CoreReducer {
    pub fn new(missing_field: MissingFieldPolicy) -> Self {
        Self { missing_field }
    }

    pub fn missing_field_policy(&self) -> MissingFieldPolicy {
        self.missing_field
    }

    fn create_missing(&self) -> bool {
        self.missing_field == MissingFieldPolicy::CreateOnDemand
    }
}

impl FieldReducer for CoreReducer {
    #[tracing::instrument(level = "trace", skip_all, fields(kind = %intent.kind_name()))]
    fn reduce(&self, mut snapshot: Snapshot, intent: FieldIntent) -> Reduction {
        let kind = match intent.kind() {
            Some(kind) => kind,
            None => {
                let kind = intent.kind_name().to_string();
                tracing::debug!(%kind, "ignoring unrecognized intent");
                return (snapshot, Some(StoreDiagnostic::UnrecognizedIntent { kind }));
            }
        };

        let create = self.create_missing();
        let missing = |field_id: FieldId| StoreDiagnostic::MissingField { kind, field_id };

        let diagnostic = match intent {
            FieldIntent::SetupField(p) | FieldIntent::SetUi(p) => {
                match snapshot.record_mut(&p.field_id, create) {
                    Some(record) => {
                        record.ui.assign(p.ui);
                        None
                    }
                    None => Some(missing(p.field_id)),
                }
            }

            FieldIntent::AddFields(fields) => {
                if !fields.is_empty() {
                    let current = snapshot.fields_mut();
                    for (field_id, record) in fields {
                        current.insert(field_id, Arc::new(record));
                    }
                }
                None
            }

            FieldIntent::RemoveFields(field_ids) => {
                if field_ids.iter().any(|id| snapshot.contains(id.as_str())) {
                    let current = snapshot.fields_mut();
                    for field_id in &field_ids {
                        current.remove(field_id);
                    }
                }
                None
            }

            FieldIntent::UpdateField(p) => match snapshot.record_mut(&p.field_id, create) {
                Some(record) => {
                    record.merge(p.data);
                    None
                }
                None => Some(missing(p.field_id)),
            },

            FieldIntent::ResetStore(p) => {
                snapshot = p.fields;
                None
            }

            FieldIntent::MarkFieldValid(p) => match snapshot.record_mut(&p.field_id, create) {
                Some(record) => {
                    record.ui.validity = Validity::Valid;
                    None
                }
                None => Some(missing(p.field_id)),
            },

            FieldIntent::MarkFieldInvalid(p) => match snapshot.record_mut(&p.field_id, create) {
                Some(record) => {
                    record.ui.validity = Validity::Invalid(p.error);
                    None
                }
                None => Some(missing(p.field_id)),
            },

            FieldIntent::ReceiveComplexGroup(p) => {
                let field_id = p.field_id;
                match snapshot.get(field_id.as_str()) {
                    None if !create => Some(missing(field_id)),
                    Some(record) if !is_group_sequence(record) => {
                        Some(StoreDiagnostic::NotComplex { field_id })
                    }
                    Some(record)
                        if record
                            .value
                            .groups()
                            .map_or(false, |groups| groups.iter().any(|g| g.id == p.group.id)) =>
                    {
                        Some(StoreDiagnostic::DuplicateGroup {
                            field_id,
                            group_id: p.group.id,
                        })
                    }
                    _ => {
                        match snapshot
                            .record_mut(&field_id, true)
                            .and_then(|record| record.value.groups_mut())
                        {
                            Some(groups) => {
                                groups.push(Arc::new(p.group));
                                None
                            }
                            None => Some(StoreDiagnostic::NotComplex { field_id }),
                        }
                    }
                }
            }

            FieldIntent::ExpandComplexGroup(p) | FieldIntent::CollapseComplexGroup(p) => {
                let index = match snapshot.groups(p.field_id.as_str()) {
                    None if !snapshot.contains(p.field_id.as_str()) => {
                        Err(missing(p.field_id.clone()))
                    }
                    None => Err(StoreDiagnostic::NotComplex {
                        field_id: p.field_id.clone(),
                    }),
                    Some(groups) => groups
                        .iter()
                        .position(|group| group.id == p.group_id)
                        .ok_or_else(|| StoreDiagnostic::MissingGroup {
                            field_id: p.field_id.clone(),
                            group_id: p.group_id.clone(),
                        }),
                };
                match index {
                    Ok(index) => {
                        let unchanged = snapshot
                            .groups(p.field_id.as_str())
                            .map(|groups| groups[index].collapsed == Some(p.collapsed))
                            .unwrap_or(false);
                        if !unchanged {
                            if let Some(groups) = snapshot
                                .record_mut(&p.field_id, false)
                                .and_then(|record| record.value.groups_mut())
                            {
                                Arc::make_mut(&mut groups[index]).collapsed = Some(p.collapsed);
                            }
                        }
                        None
                    }
                    Err(diagnostic) => Some(diagnostic),
                }
            }

            FieldIntent::SwitchComplexTab(p) => match snapshot.record_mut(&p.field_id, create) {
                Some(record) => {
                    record.ui.current_tab = Some(p.group_id);
                    None
                }
                None => Some(missing(p.field_id)),
            },

            FieldIntent::RedrawMap(p) => match snapshot.record_mut(&p.field_id, create) {
                Some(record) => {
                    record.ui.redraw_map = Some(true);
                    None
                }
                None => Some(missing(p.field_id)),
            },

            FieldIntent::Other(raw) => Some(StoreDiagnostic::UnrecognizedIntent { kind: raw.kind }),
        };

        match &diagnostic {
            Some(diagnostic) => tracing::warn!(%diagnostic, "intent left the snapshot unchanged"),
            None => tracing::trace!(fields = snapshot.len(), "intent applied"),
        }
        (snapshot, diagnostic)
    }
}

/// A `null` value can still become a group sequence, any other plain value cannot.
fn is_group_sequence(record: &FieldRecord) -> bool {
    match &record.value {
        FieldValue::Groups(_) => true,
        FieldValue::Plain(value) => value.is_null(),
    }
}
