//! Per-field presentation state.
//!
//! The validity verdict is stored as [`Validity`] so that an invalid field
//! always carries its diagnostic and a valid one never does. On the wire the
//! ui object stays flat: `{valid, error?, current_tab?, redraw_map?, ...}`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::ids::{ErrorMessage, GroupId};
use crate::record::deep_merge;

pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// The two validity states of a field.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Validity {
    #[default]
    Valid,
    Invalid(ErrorMessage),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn error(&self) -> Option<&ErrorMessage> {
        match self {
            Validity::Valid => None,
            Validity::Invalid(error) => Some(error),
        }
    }
}

/// Transient presentation state of a single field.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawFieldUi", into = "RawFieldUi")]
pub struct FieldUi {
    pub validity: Validity,
    /// The group whose tab is active, for tabbed complex fields.
    pub current_tab: Option<GroupId>,
    /// Set when a map field must be redrawn. The renderer clears it.
    pub redraw_map: Option<bool>,
    /// Caller-defined keys, kept verbatim.
    pub extra: JsonMap,
}

impl FieldUi {
    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    pub fn error(&self) -> Option<&ErrorMessage> {
        self.validity.error()
    }

    /// Shallow merge: every key present in the patch overwrites, the rest is untouched.
    pub fn assign(&mut self, patch: UiPatch) {
        let extra = self.apply_known(patch);
        for (key, value) in extra {
            self.extra.insert(key, value);
        }
    }

    /// Like [`FieldUi::assign`], but caller-defined object values are merged
    /// recursively instead of being replaced.
    pub fn deep_merge(&mut self, patch: UiPatch) {
        let extra = self.apply_known(patch);
        for (key, value) in extra {
            match self.extra.get_mut(&key) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    self.extra.insert(key, value);
                }
            }
        }
    }

    fn apply_known(&mut self, patch: UiPatch) -> JsonMap {
        let UiPatch {
            validity,
            current_tab,
            redraw_map,
            extra,
        } = patch;
        if let Some(validity) = validity {
            self.validity = validity;
        }
        if let Some(current_tab) = current_tab {
            self.current_tab = current_tab;
        }
        if let Some(redraw_map) = redraw_map {
            self.redraw_map = redraw_map;
        }
        extra
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawFieldUi {
    #[serde(default = "default_valid")]
    valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ErrorMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_tab: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redraw_map: Option<bool>,
    #[serde(flatten)]
    extra: JsonMap,
}

fn default_valid() -> bool {
    true
}

impl TryFrom<RawFieldUi> for FieldUi {
    type Error = StoreError;

    fn try_from(raw: RawFieldUi) -> StoreResult<Self> {
        let validity = match (raw.valid, raw.error) {
            (true, None) => Validity::Valid,
            (false, Some(error)) => Validity::Invalid(error),
            (true, Some(_)) => {
                return Err(StoreError::malformed("ui", "a valid field cannot carry an error"))
            }
            (false, None) => return Err(StoreError::EmptyErrorMessage),
        };
        Ok(Self {
            validity,
            current_tab: raw.current_tab,
            redraw_map: raw.redraw_map,
            extra: raw.extra,
        })
    }
}

impl From<FieldUi> for RawFieldUi {
    fn from(ui: FieldUi) -> Self {
        let (valid, error) = match ui.validity {
            Validity::Valid => (true, None),
            Validity::Invalid(error) => (false, Some(error)),
        };
        Self {
            valid,
            error,
            current_tab: ui.current_tab,
            redraw_map: ui.redraw_map,
            extra: ui.extra,
        }
    }
}

/// A partial ui object to merge into a field's [`FieldUi`].
///
/// `None` means "leave untouched". For the nullable keys, `Some(None)` clears the key.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawUiPatch", into = "RawUiPatch")]
pub struct UiPatch {
    pub validity: Option<Validity>,
    pub current_tab: Option<Option<GroupId>>,
    pub redraw_map: Option<Option<bool>>,
    pub extra: JsonMap,
}

impl UiPatch {
    pub fn with_current_tab(mut self, tab: impl Into<GroupId>) -> Self {
        self.current_tab = Some(Some(tab.into()));
        self
    }

    pub fn with_redraw_map(mut self, redraw: bool) -> Self {
        self.redraw_map = Some(Some(redraw));
        self
    }

    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validity = Some(validity);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct RawUiPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid: Option<bool>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    error: Option<Option<ErrorMessage>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    current_tab: Option<Option<GroupId>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    redraw_map: Option<Option<bool>>,
    #[serde(flatten)]
    extra: JsonMap,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TryFrom<RawUiPatch> for UiPatch {
    type Error = StoreError;

    fn try_from(raw: RawUiPatch) -> StoreResult<Self> {
        let validity = match (raw.valid, raw.error) {
            (None, None) => None,
            (Some(true), None) | (Some(true), Some(None)) | (None, Some(None)) => {
                Some(Validity::Valid)
            }
            (Some(false), Some(Some(error))) | (None, Some(Some(error))) => {
                Some(Validity::Invalid(error))
            }
            (Some(true), Some(Some(_))) => {
                return Err(StoreError::malformed("ui", "a valid field cannot carry an error"))
            }
            (Some(false), _) => return Err(StoreError::EmptyErrorMessage),
        };
        Ok(Self {
            validity,
            current_tab: raw.current_tab,
            redraw_map: raw.redraw_map,
            extra: raw.extra,
        })
    }
}

impl From<UiPatch> for RawUiPatch {
    fn from(patch: UiPatch) -> Self {
        let (valid, error) = match patch.validity {
            None => (None, None),
            Some(Validity::Valid) => (Some(true), None),
            Some(Validity::Invalid(error)) => (Some(false), Some(Some(error))),
        };
        Self {
            valid,
            error,
            current_tab: patch.current_tab,
            redraw_map: patch.redraw_map,
            extra: patch.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ui(value: serde_json::Value) -> FieldUi {
        serde_json::from_value(value).unwrap()
    }

    fn patch(value: serde_json::Value) -> UiPatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_ui_keys_default_to_valid() {
        let ui = ui(json!({}));
        assert!(ui.is_valid());
        assert_eq!(ui.current_tab, None);
        assert_eq!(ui.redraw_map, None);
        assert_eq!(serde_json::to_value(&ui).unwrap(), json!({"valid": true}));
    }

    #[test]
    fn invalid_without_error_is_rejected() {
        assert!(serde_json::from_value::<FieldUi>(json!({"valid": false})).is_err());
        assert!(serde_json::from_value::<FieldUi>(json!({"valid": true, "error": "x"})).is_err());
        assert!(serde_json::from_value::<UiPatch>(json!({"valid": false})).is_err());
        assert!(serde_json::from_value::<UiPatch>(json!({"valid": true, "error": "x"})).is_err());
    }

    #[test]
    fn assign_keeps_untouched_keys() {
        let mut current = ui(json!({"valid": true, "current_tab": "g1"}));
        current.assign(patch(json!({"redraw_map": true})));
        assert_eq!(
            serde_json::to_value(&current).unwrap(),
            json!({"valid": true, "current_tab": "g1", "redraw_map": true})
        );
    }

    #[test]
    fn null_clears_nullable_keys() {
        let mut current = ui(json!({"valid": true, "current_tab": "g1", "redraw_map": true}));
        current.assign(patch(json!({"current_tab": null, "redraw_map": null})));
        assert_eq!(current.current_tab, None);
        assert_eq!(current.redraw_map, None);
    }

    #[test]
    fn error_alone_marks_invalid_and_null_error_marks_valid() {
        let mut current = FieldUi::default();
        current.assign(patch(json!({"error": "required"})));
        assert_eq!(current.error().map(ErrorMessage::as_str), Some("required"));
        current.assign(patch(json!({"error": null})));
        assert!(current.is_valid());
        assert_eq!(current.error(), None);
    }

    #[test]
    fn assign_replaces_objects_but_deep_merge_combines_them() {
        let base = ui(json!({"layout": {"width": 2, "height": 3}}));

        let mut shallow = base.clone();
        shallow.assign(patch(json!({"layout": {"width": 4}})));
        assert_eq!(shallow.extra["layout"], json!({"width": 4}));

        let mut deep = base;
        deep.deep_merge(patch(json!({"layout": {"width": 4}})));
        assert_eq!(deep.extra["layout"], json!({"width": 4, "height": 3}));
    }

    #[test]
    fn patch_roundtrips_through_its_wire_form() {
        let original = json!({"valid": false, "error": "bad", "current_tab": null, "hint": 1});
        let decoded = patch(original.clone());
        assert_eq!(serde_json::to_value(&decoded).unwrap(), original);
    }
}
