//! The immutable, normalized field store value.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::{ErrorMessage, FieldId};
use crate::record::{ComplexGroup, FieldRecord};

/// One complete value of the field store at a point in time.
///
/// Cloning is cheap and a clone never observes later transitions: every
/// update goes through `Arc::make_mut`, which copies only the map and the
/// record on the touched path while they are shared, and leaves every other
/// record shared between the old and the new snapshot.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Arc<BTreeMap<FieldId, Arc<FieldRecord>>>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldRecord> {
        self.0.get(field_id).map(Arc::as_ref)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.0.contains_key(field_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldId, &FieldRecord)> {
        self.0.iter().map(|(id, record)| (id, record.as_ref()))
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &FieldId> {
        self.0.keys()
    }

    /// The groups of a complex field, in render order.
    pub fn groups(&self, field_id: &str) -> Option<&[Arc<ComplexGroup>]> {
        self.get(field_id).and_then(|record| record.value.groups())
    }

    /// Every field currently marked invalid, with its diagnostic.
    pub fn invalid_fields(&self) -> Vec<(&FieldId, &ErrorMessage)> {
        self.0
            .iter()
            .filter_map(|(id, record)| record.ui.error().map(|error| (id, error)))
            .collect()
    }

    /// True if both snapshots hold the very same allocation for this field,
    /// i.e. the record was carried over untouched.
    pub fn shares_record_with(&self, other: &Snapshot, field_id: &str) -> bool {
        match (self.0.get(field_id), other.0.get(field_id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn fields_mut(&mut self) -> &mut BTreeMap<FieldId, Arc<FieldRecord>> {
        Arc::make_mut(&mut self.0)
    }

    /// Copy-on-write access to one record. With `create`, a missing record
    /// is created empty first, so a field never exists without `value` and `ui`.
    pub(crate) fn record_mut(&mut self, field_id: &FieldId, create: bool) -> Option<&mut FieldRecord> {
        if !create && !self.0.contains_key(field_id) {
            return None;
        }
        let fields = self.fields_mut();
        fields
            .entry(field_id.clone())
            .or_insert_with(|| Arc::new(FieldRecord::default()));
        fields.get_mut(field_id).map(Arc::make_mut)
    }
}

impl FromIterator<(FieldId, FieldRecord)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (FieldId, FieldRecord)>>(iter: T) -> Self {
        Self(Arc::new(
            iter.into_iter()
                .map(|(id, record)| (id, Arc::new(record)))
                .collect(),
        ))
    }
}

impl From<BTreeMap<FieldId, FieldRecord>> for Snapshot {
    fn from(fields: BTreeMap<FieldId, FieldRecord>) -> Self {
        fields.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;
    use serde_json::json;

    fn two_fields() -> Snapshot {
        serde_json::from_value(json!({
            "f1": {"value": "a", "ui": {"valid": true}},
            "f2": {"value": [{"id": "g1"}], "ui": {"valid": false, "error": "required"}},
        }))
        .unwrap()
    }

    #[test]
    fn record_mut_copies_only_the_touched_record() {
        let before = two_fields();
        let mut after = before.clone();
        after
            .record_mut(&"f1".into(), false)
            .unwrap()
            .value = FieldValue::Plain(json!("b"));

        assert_eq!(before.get("f1").unwrap().value, FieldValue::Plain(json!("a")));
        assert_eq!(after.get("f1").unwrap().value, FieldValue::Plain(json!("b")));
        assert!(!before.shares_record_with(&after, "f1"));
        assert!(before.shares_record_with(&after, "f2"));
    }

    #[test]
    fn record_mut_creates_only_when_asked() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.record_mut(&"missing".into(), false).is_none());
        assert!(!snapshot.contains("missing"));
        assert!(snapshot.record_mut(&"missing".into(), true).is_some());
        assert!(snapshot.get("missing").unwrap().ui.is_valid());
    }

    #[test]
    fn selectors() {
        let snapshot = two_fields();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.groups("f2").unwrap()[0].id.as_str(), "g1");
        assert!(snapshot.groups("f1").is_none());
        let invalid = snapshot.invalid_fields();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].0.as_str(), "f2");
        assert_eq!(invalid[0].1.as_str(), "required");
    }
}
