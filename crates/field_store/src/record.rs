//! Field records and complex-field groups.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ids::GroupId;
use crate::ui::{FieldUi, JsonMap, UiPatch};

/// Recursively merge `patch` into `target`.
///
/// Objects are merged key by key. Any other value, arrays included,
/// replaces what was there.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// One repeatable sub-record of a complex field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplexGroup {
    pub id: GroupId,
    /// Absent until the host or an expand/collapse intent sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    /// Values of the group's sub-fields.
    #[serde(flatten)]
    pub fields: JsonMap,
}

impl ComplexGroup {
    pub fn new(id: impl Into<GroupId>) -> Self {
        Self {
            id: id.into(),
            collapsed: None,
            fields: JsonMap::new(),
        }
    }

    /// Whether the group renders collapsed. An unset flag means expanded.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed.unwrap_or(false)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Read a group out of an arbitrary JSON value, if it has a group's shape:
    /// an object with a string `id` and, optionally, a boolean `collapsed`.
    fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id")?.as_str()?;
        let collapsed = match object.get("collapsed") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(collapsed)) => Some(*collapsed),
            Some(_) => return None,
        };
        let fields = object
            .iter()
            .filter(|(key, _)| *key != "id" && *key != "collapsed")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Some(Self {
            id: id.into(),
            collapsed,
            fields,
        })
    }
}

/// The data payload of a field.
///
/// Complex fields hold an ordered sequence of groups. Each group sits behind
/// its own `Arc`, so updating one group leaves its siblings shared with older
/// snapshots.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Groups(Vec<Arc<ComplexGroup>>),
    Plain(Value),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Plain(Value::Null)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                match items
                    .iter()
                    .map(|item| ComplexGroup::from_json(item).map(Arc::new))
                    .collect::<Option<Vec<_>>>()
                {
                    Some(groups) => FieldValue::Groups(groups),
                    None => FieldValue::Plain(Value::Array(items)),
                }
            }
            other => FieldValue::Plain(other),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(FieldValue::from)
    }
}

impl FieldValue {
    pub fn groups(&self) -> Option<&[Arc<ComplexGroup>]> {
        match self {
            FieldValue::Groups(groups) => Some(groups),
            FieldValue::Plain(_) => None,
        }
    }

    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            FieldValue::Plain(value) => Some(value),
            FieldValue::Groups(_) => None,
        }
    }

    /// Mutable access to the group sequence, starting one if the value is still `null`.
    /// `None` if the field holds some other, non-complex value.
    pub(crate) fn groups_mut(&mut self) -> Option<&mut Vec<Arc<ComplexGroup>>> {
        if matches!(self, FieldValue::Plain(Value::Null)) {
            *self = FieldValue::Groups(Vec::new());
        }
        match self {
            FieldValue::Groups(groups) => Some(groups),
            FieldValue::Plain(_) => None,
        }
    }

    /// Deep-merge a JSON patch into the value. Only a plain object merges
    /// into a plain object; anything else replaces the whole value.
    pub fn merge(&mut self, patch: Value) {
        match (self, patch) {
            (FieldValue::Plain(target @ Value::Object(_)), patch @ Value::Object(_)) => {
                deep_merge(target, patch)
            }
            (this, patch) => *this = FieldValue::from(patch),
        }
    }
}

/// One entry of a [`Snapshot`](crate::Snapshot).
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldRecord {
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default)]
    pub ui: FieldUi,
    /// Everything else the host put on the field (type, name, settings...).
    #[serde(flatten)]
    pub attributes: JsonMap,
}

impl FieldRecord {
    pub fn new(value: impl Into<FieldValue>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_ui(mut self, ui: FieldUi) -> Self {
        self.ui = ui;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Path-addressed deep merge at the record root.
    pub fn merge(&mut self, patch: FieldPatch) {
        let FieldPatch {
            value,
            ui,
            attributes,
        } = patch;
        if let Some(value) = value {
            self.value.merge(value);
        }
        if let Some(ui) = ui {
            self.ui.deep_merge(ui);
        }
        for (key, value) in attributes {
            match self.attributes.get_mut(&key) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    self.attributes.insert(key, value);
                }
            }
        }
    }
}

impl From<Vec<ComplexGroup>> for FieldValue {
    fn from(groups: Vec<ComplexGroup>) -> Self {
        FieldValue::Groups(groups.into_iter().map(Arc::new).collect())
    }
}

/// The `data` of an update-field intent.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldPatch {
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiPatch>,
    #[serde(flatten)]
    pub attributes: JsonMap,
}

/// An explicit `"value": null` is a value to assign, not an absent key.
fn explicit_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl FieldPatch {
    pub fn value(value: Value) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn ui(ui: UiPatch) -> Self {
        Self {
            ui: Some(ui),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn arrays_of_identified_objects_decode_as_groups() {
        let value: FieldValue =
            serde_json::from_value(json!([{"id": "a"}, {"id": "b", "collapsed": true, "x": 1}]))
                .unwrap();
        let groups = value.groups().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].collapsed, None);
        assert!(!groups[0].is_collapsed());
        assert!(groups[1].is_collapsed());
        assert_eq!(groups[1].fields["x"], json!(1));
    }

    #[test]
    fn other_values_stay_plain() {
        for raw in [
            json!("text"),
            json!(["a", "b"]),
            json!([{"id": 1}]),
            json!([{"id": "a", "collapsed": "no"}]),
            json!({"lat": 1.0}),
        ] {
            let value: FieldValue = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(value, FieldValue::Plain(raw));
        }
    }

    #[test]
    fn groups_serialize_back_to_a_flat_array() {
        let value = FieldValue::from(vec![
            ComplexGroup::new("g1").with_field("title", json!("Hi")),
            ComplexGroup::new("g2"),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!([
                {"id": "g1", "title": "Hi"},
                {"id": "g2"}
            ])
        );
    }

    #[test]
    fn deep_merge_replaces_arrays_and_scalars() {
        let mut target = json!({"a": {"b": 1, "c": [1, 2]}, "d": "x"});
        deep_merge(&mut target, json!({"a": {"c": [3]}, "d": {"e": true}}));
        assert_eq!(target, json!({"a": {"b": 1, "c": [3]}, "d": {"e": true}}));
    }

    #[test]
    fn record_merge_preserves_non_overlapping_keys() {
        let mut record: FieldRecord = serde_json::from_value(json!({
            "value": {"lat": 1.0, "lng": 2.0},
            "ui": {"valid": true, "current_tab": "g1"},
            "type": "map",
            "settings": {"zoom": 3, "center": "x"}
        }))
        .unwrap();

        let patch: FieldPatch = serde_json::from_value(json!({
            "value": {"lat": 5.0},
            "ui": {"redraw_map": true},
            "settings": {"zoom": 9}
        }))
        .unwrap();
        record.merge(patch);

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "value": {"lat": 5.0, "lng": 2.0},
                "ui": {"valid": true, "current_tab": "g1", "redraw_map": true},
                "type": "map",
                "settings": {"zoom": 9, "center": "x"}
            })
        );
    }

    #[test]
    fn value_patch_replaces_group_sequences() {
        let mut record = FieldRecord::new(vec![ComplexGroup::new("a"), ComplexGroup::new("b")]);
        record.merge(FieldPatch::value(json!([{"id": "b"}])));
        let ids: Vec<_> = record
            .value
            .groups()
            .unwrap()
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn records_always_have_value_and_ui() {
        let record: FieldRecord = serde_json::from_value(json!({"type": "text"})).unwrap();
        assert_eq!(record.value, FieldValue::Plain(Value::Null));
        assert!(record.ui.is_valid());
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded["value"], Value::Null);
        assert_eq!(encoded["ui"], json!({"valid": true}));
    }

    #[test]
    fn id_keyed_arrays_roundtrip_without_added_keys() {
        for raw in [
            json!([{"id": "12", "type": "post"}]),
            json!([{"id": "a"}, {"id": "b", "collapsed": true}, {"id": "c", "collapsed": false}]),
        ] {
            let value: FieldValue = serde_json::from_value(raw.clone()).unwrap();
            assert!(value.groups().is_some());
            assert_eq!(serde_json::to_value(&value).unwrap(), raw);
        }
    }
}
