//! Intents: the requested state transitions dispatched into the store.
//!
//! On the wire an intent is `{"type": "<kind>", "payload": ...}`, with
//! camelCase payload keys. Known kinds decode into typed variants; a known
//! kind whose payload does not fit fails to decode with
//! [`StoreError::MalformedPayload`]. Unknown kinds decode into
//! [`FieldIntent::Other`] and are carried through untouched so that a
//! decorating reducer can act on them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::ids::{ErrorMessage, FieldId, GroupId};
use crate::record::{ComplexGroup, FieldPatch, FieldRecord};
use crate::snapshot::Snapshot;
use crate::ui::UiPatch;

/// Every intent kind the core reducer knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntentKind {
    SetupField,
    SetUi,
    AddFields,
    RemoveFields,
    UpdateField,
    ResetStore,
    MarkFieldValid,
    MarkFieldInvalid,
    ReceiveComplexGroup,
    ExpandComplexGroup,
    CollapseComplexGroup,
    SwitchComplexTab,
    RedrawMap,
}

impl IntentKind {
    pub const ALL: [IntentKind; 13] = [
        IntentKind::SetupField,
        IntentKind::SetUi,
        IntentKind::AddFields,
        IntentKind::RemoveFields,
        IntentKind::UpdateField,
        IntentKind::ResetStore,
        IntentKind::MarkFieldValid,
        IntentKind::MarkFieldInvalid,
        IntentKind::ReceiveComplexGroup,
        IntentKind::ExpandComplexGroup,
        IntentKind::CollapseComplexGroup,
        IntentKind::SwitchComplexTab,
        IntentKind::RedrawMap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::SetupField => "setup-field",
            IntentKind::SetUi => "set-ui",
            IntentKind::AddFields => "add-fields",
            IntentKind::RemoveFields => "remove-fields",
            IntentKind::UpdateField => "update-field",
            IntentKind::ResetStore => "reset-store",
            IntentKind::MarkFieldValid => "mark-field-valid",
            IntentKind::MarkFieldInvalid => "mark-field-invalid",
            IntentKind::ReceiveComplexGroup => "receive-complex-group",
            IntentKind::ExpandComplexGroup => "expand-complex-group",
            IntentKind::CollapseComplexGroup => "collapse-complex-group",
            IntentKind::SwitchComplexTab => "switch-complex-tab",
            IntentKind::RedrawMap => "redraw-map",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// Payload of `setup-field` and `set-ui`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUi {
    pub field_id: FieldId,
    pub ui: UiPatch,
}

/// Payload of the intents that only address a field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRef {
    pub field_id: FieldId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateField {
    pub field_id: FieldId,
    pub data: FieldPatch,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResetStore {
    pub fields: Snapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkInvalid {
    pub field_id: FieldId,
    pub error: ErrorMessage,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveGroup {
    pub field_id: FieldId,
    pub group: ComplexGroup,
}

/// Payload of `expand-complex-group` and `collapse-complex-group`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleGroup {
    pub field_id: FieldId,
    pub group_id: GroupId,
    pub collapsed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchTab {
    pub field_id: FieldId,
    pub group_id: GroupId,
}

/// An intent in its undecoded wire form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawIntent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl RawIntent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// A requested transition of the field store.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldIntent {
    SetupField(SetUi),
    SetUi(SetUi),
    /// Whole-record replace of every listed field.
    AddFields(BTreeMap<FieldId, FieldRecord>),
    RemoveFields(Vec<FieldId>),
    UpdateField(UpdateField),
    ResetStore(ResetStore),
    MarkFieldValid(FieldRef),
    MarkFieldInvalid(MarkInvalid),
    ReceiveComplexGroup(ReceiveGroup),
    ExpandComplexGroup(ToggleGroup),
    CollapseComplexGroup(ToggleGroup),
    SwitchComplexTab(SwitchTab),
    RedrawMap(FieldRef),
    /// Any kind the core does not know. The core leaves the snapshot alone.
    Other(RawIntent),
}

impl FieldIntent {
    /// The kind of a known intent, `None` for [`FieldIntent::Other`].
    pub fn kind(&self) -> Option<IntentKind> {
        Some(match self {
            FieldIntent::SetupField(_) => IntentKind::SetupField,
            FieldIntent::SetUi(_) => IntentKind::SetUi,
            FieldIntent::AddFields(_) => IntentKind::AddFields,
            FieldIntent::RemoveFields(_) => IntentKind::RemoveFields,
            FieldIntent::UpdateField(_) => IntentKind::UpdateField,
            FieldIntent::ResetStore(_) => IntentKind::ResetStore,
            FieldIntent::MarkFieldValid(_) => IntentKind::MarkFieldValid,
            FieldIntent::MarkFieldInvalid(_) => IntentKind::MarkFieldInvalid,
            FieldIntent::ReceiveComplexGroup(_) => IntentKind::ReceiveComplexGroup,
            FieldIntent::ExpandComplexGroup(_) => IntentKind::ExpandComplexGroup,
            FieldIntent::CollapseComplexGroup(_) => IntentKind::CollapseComplexGroup,
            FieldIntent::SwitchComplexTab(_) => IntentKind::SwitchComplexTab,
            FieldIntent::RedrawMap(_) => IntentKind::RedrawMap,
            FieldIntent::Other(_) => return None,
        })
    }

    /// The wire name of the intent's kind.
    pub fn kind_name(&self) -> &str {
        match self {
            FieldIntent::Other(raw) => raw.kind.as_str(),
            known => known.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// The single field this intent addresses, if it addresses exactly one.
    pub fn field_id(&self) -> Option<&FieldId> {
        match self {
            FieldIntent::SetupField(p) | FieldIntent::SetUi(p) => Some(&p.field_id),
            FieldIntent::UpdateField(p) => Some(&p.field_id),
            FieldIntent::MarkFieldValid(p) | FieldIntent::RedrawMap(p) => Some(&p.field_id),
            FieldIntent::MarkFieldInvalid(p) => Some(&p.field_id),
            FieldIntent::ReceiveComplexGroup(p) => Some(&p.field_id),
            FieldIntent::ExpandComplexGroup(p) | FieldIntent::CollapseComplexGroup(p) => {
                Some(&p.field_id)
            }
            FieldIntent::SwitchComplexTab(p) => Some(&p.field_id),
            FieldIntent::AddFields(_)
            | FieldIntent::RemoveFields(_)
            | FieldIntent::ResetStore(_)
            | FieldIntent::Other(_) => None,
        }
    }

    pub fn set_ui(field_id: impl Into<FieldId>, ui: UiPatch) -> Self {
        FieldIntent::SetUi(SetUi {
            field_id: field_id.into(),
            ui,
        })
    }

    pub fn setup_field(field_id: impl Into<FieldId>, ui: UiPatch) -> Self {
        FieldIntent::SetupField(SetUi {
            field_id: field_id.into(),
            ui,
        })
    }

    pub fn add_fields(fields: impl IntoIterator<Item = (FieldId, FieldRecord)>) -> Self {
        FieldIntent::AddFields(fields.into_iter().collect())
    }

    pub fn remove_fields<I, T>(field_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FieldId>,
    {
        FieldIntent::RemoveFields(field_ids.into_iter().map(Into::into).collect())
    }

    pub fn update_field(field_id: impl Into<FieldId>, data: FieldPatch) -> Self {
        FieldIntent::UpdateField(UpdateField {
            field_id: field_id.into(),
            data,
        })
    }

    pub fn reset_store(fields: Snapshot) -> Self {
        FieldIntent::ResetStore(ResetStore { fields })
    }

    pub fn mark_valid(field_id: impl Into<FieldId>) -> Self {
        FieldIntent::MarkFieldValid(FieldRef {
            field_id: field_id.into(),
        })
    }

    /// Fails if `error` is blank: an invalid field must say why.
    pub fn mark_invalid(field_id: impl Into<FieldId>, error: impl Into<String>) -> StoreResult<Self> {
        Ok(FieldIntent::MarkFieldInvalid(MarkInvalid {
            field_id: field_id.into(),
            error: ErrorMessage::new(error)?,
        }))
    }

    pub fn receive_group(field_id: impl Into<FieldId>, group: ComplexGroup) -> Self {
        FieldIntent::ReceiveComplexGroup(ReceiveGroup {
            field_id: field_id.into(),
            group,
        })
    }

    pub fn expand_group(field_id: impl Into<FieldId>, group_id: impl Into<GroupId>) -> Self {
        FieldIntent::ExpandComplexGroup(ToggleGroup {
            field_id: field_id.into(),
            group_id: group_id.into(),
            collapsed: false,
        })
    }

    pub fn collapse_group(field_id: impl Into<FieldId>, group_id: impl Into<GroupId>) -> Self {
        FieldIntent::CollapseComplexGroup(ToggleGroup {
            field_id: field_id.into(),
            group_id: group_id.into(),
            collapsed: true,
        })
    }

    pub fn switch_tab(field_id: impl Into<FieldId>, group_id: impl Into<GroupId>) -> Self {
        FieldIntent::SwitchComplexTab(SwitchTab {
            field_id: field_id.into(),
            group_id: group_id.into(),
        })
    }

    pub fn redraw_map(field_id: impl Into<FieldId>) -> Self {
        FieldIntent::RedrawMap(FieldRef {
            field_id: field_id.into(),
        })
    }

    /// Decode an intent from its JSON wire form.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let raw: RawIntent = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Encode the intent into its wire form.
    pub fn to_raw(&self) -> StoreResult<RawIntent> {
        let payload = match self {
            FieldIntent::SetupField(p) | FieldIntent::SetUi(p) => serde_json::to_value(p),
            FieldIntent::AddFields(p) => serde_json::to_value(p),
            FieldIntent::RemoveFields(p) => serde_json::to_value(p),
            FieldIntent::UpdateField(p) => serde_json::to_value(p),
            FieldIntent::ResetStore(p) => serde_json::to_value(p),
            FieldIntent::MarkFieldValid(p) | FieldIntent::RedrawMap(p) => serde_json::to_value(p),
            FieldIntent::MarkFieldInvalid(p) => serde_json::to_value(p),
            FieldIntent::ReceiveComplexGroup(p) => serde_json::to_value(p),
            FieldIntent::ExpandComplexGroup(p) | FieldIntent::CollapseComplexGroup(p) => {
                serde_json::to_value(p)
            }
            FieldIntent::SwitchComplexTab(p) => serde_json::to_value(p),
            FieldIntent::Other(raw) => return Ok(raw.clone()),
        }?;
        Ok(RawIntent::new(self.kind_name(), payload))
    }
}

fn decode<T: DeserializeOwned>(kind: IntentKind, payload: Value) -> StoreResult<T> {
    serde_json::from_value(payload).map_err(|e| StoreError::malformed(kind, e))
}

impl TryFrom<RawIntent> for FieldIntent {
    type Error = StoreError;

    fn try_from(raw: RawIntent) -> StoreResult<Self> {
        let kind = match raw.kind.parse::<IntentKind>() {
            Ok(kind) => kind,
            Err(()) => return Ok(FieldIntent::Other(raw)),
        };
        let payload = raw.payload;
        Ok(match kind {
            IntentKind::SetupField => FieldIntent::SetupField(decode(kind, payload)?),
            IntentKind::SetUi => FieldIntent::SetUi(decode(kind, payload)?),
            IntentKind::AddFields => FieldIntent::AddFields(decode(kind, payload)?),
            IntentKind::RemoveFields => FieldIntent::RemoveFields(decode(kind, payload)?),
            IntentKind::UpdateField => FieldIntent::UpdateField(decode(kind, payload)?),
            IntentKind::ResetStore => FieldIntent::ResetStore(decode(kind, payload)?),
            IntentKind::MarkFieldValid => FieldIntent::MarkFieldValid(decode(kind, payload)?),
            IntentKind::MarkFieldInvalid => FieldIntent::MarkFieldInvalid(decode(kind, payload)?),
            IntentKind::ReceiveComplexGroup => {
                FieldIntent::ReceiveComplexGroup(decode(kind, payload)?)
            }
            IntentKind::ExpandComplexGroup => {
                FieldIntent::ExpandComplexGroup(decode(kind, payload)?)
            }
            IntentKind::CollapseComplexGroup => {
                FieldIntent::CollapseComplexGroup(decode(kind, payload)?)
            }
            IntentKind::SwitchComplexTab => FieldIntent::SwitchComplexTab(decode(kind, payload)?),
            IntentKind::RedrawMap => FieldIntent::RedrawMap(decode(kind, payload)?),
        })
    }
}

impl Serialize for FieldIntent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_raw()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldIntent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawIntent::deserialize(deserializer)?;
        FieldIntent::try_from(raw).map_err(serde::de::Error::custom)
    }
}
