use field_store::*;
use proptest::prelude::*;
use serde_json::{json, Value};

const FIELD_IDS: [&str; 4] = ["f1", "f2", "f3", "f4"];
const GROUP_IDS: [&str; 3] = ["a", "b", "c"];

fn field_id() -> impl Strategy<Value = FieldId> {
    prop::sample::select(FIELD_IDS.to_vec()).prop_map(FieldId::from)
}

fn group_id() -> impl Strategy<Value = GroupId> {
    prop::sample::select(GROUP_IDS.to_vec()).prop_map(GroupId::from)
}

fn error_message() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Plain(Value::Null)),
        any::<i64>().prop_map(|n| FieldValue::Plain(json!(n))),
        "[a-z]{0,6}".prop_map(|s| FieldValue::Plain(json!(s))),
        (
            prop::sample::subsequence(GROUP_IDS.to_vec(), 0..=3),
            prop::collection::vec(prop::option::of(any::<bool>()), 3)
        )
            .prop_map(|(ids, collapsed)| {
                let groups: Vec<_> = ids
                    .into_iter()
                    .zip(collapsed)
                    .map(|(id, collapsed)| {
                        let mut group = ComplexGroup::new(id);
                        group.collapsed = collapsed;
                        group
                    })
                    .collect();
                FieldValue::from(groups)
            }),
    ]
}

fn field_record() -> impl Strategy<Value = FieldRecord> {
    (
        field_value(),
        prop::option::of(error_message()),
        prop::option::of(group_id()),
    )
        .prop_map(|(value, error, current_tab)| {
            let validity = match error {
                Some(error) => Validity::Invalid(ErrorMessage::new(error).unwrap()),
                None => Validity::Valid,
            };
            FieldRecord::new(value)
                .with_ui(FieldUi {
                    validity,
                    current_tab,
                    ..Default::default()
                })
                .with_attribute("type", json!("text"))
        })
}

fn snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::btree_map(field_id(), field_record(), 0..=3).prop_map(Snapshot::from)
}

fn ui_patch() -> impl Strategy<Value = UiPatch> {
    prop_oneof![
        Just(UiPatch::default()),
        group_id().prop_map(|tab| UiPatch::default().with_current_tab(tab)),
        any::<bool>().prop_map(|redraw| UiPatch::default().with_redraw_map(redraw)),
        "[a-z]{1,4}".prop_map(|key| UiPatch::default().with_key(key, json!(1))),
    ]
}

fn intent() -> impl Strategy<Value = FieldIntent> {
    prop_oneof![
        (field_id(), ui_patch()).prop_map(|(f, ui)| FieldIntent::set_ui(f, ui)),
        (field_id(), ui_patch()).prop_map(|(f, ui)| FieldIntent::setup_field(f, ui)),
        prop::collection::vec((field_id(), field_record()), 0..3).prop_map(FieldIntent::add_fields),
        prop::sample::subsequence(FIELD_IDS.to_vec(), 0..=4).prop_map(FieldIntent::remove_fields),
        (field_id(), any::<i64>())
            .prop_map(|(f, n)| FieldIntent::update_field(f, FieldPatch::value(json!({ "n": n })))),
        snapshot().prop_map(FieldIntent::reset_store),
        field_id().prop_map(FieldIntent::mark_valid),
        (field_id(), error_message()).prop_map(|(f, e)| FieldIntent::mark_invalid(f, e).unwrap()),
        (field_id(), group_id())
            .prop_map(|(f, g)| FieldIntent::receive_group(f, ComplexGroup::new(g))),
        (field_id(), group_id()).prop_map(|(f, g)| FieldIntent::expand_group(f, g)),
        (field_id(), group_id()).prop_map(|(f, g)| FieldIntent::collapse_group(f, g)),
        (field_id(), group_id()).prop_map(|(f, g)| FieldIntent::switch_tab(f, g)),
        field_id().prop_map(FieldIntent::redraw_map),
        "[a-z]{1,6}/[a-z]{1,6}"
            .prop_map(|kind| FieldIntent::Other(RawIntent::new(kind, json!({"fieldId": "f1"})))),
    ]
}

fn both_policies() -> impl Strategy<Value = CoreReducer> {
    prop_oneof![
        Just(CoreReducer::new(MissingFieldPolicy::CreateOnDemand)),
        Just(CoreReducer::new(MissingFieldPolicy::Ignore)),
    ]
}

proptest! {
    #[test]
    fn input_snapshot_is_never_mutated(
        reducer in both_policies(),
        before in snapshot(),
        intent in intent(),
    ) {
        let frozen = serde_json::to_value(&before).unwrap();
        let _after = reducer.reduce(before.clone(), intent);
        prop_assert_eq!(serde_json::to_value(&before).unwrap(), frozen);
    }

    #[test]
    fn every_field_stays_whole_and_consistent(
        reducer in both_policies(),
        before in snapshot(),
        intents in prop::collection::vec(intent(), 0..8),
    ) {
        let after = intents
            .into_iter()
            .fold(before, |snapshot, intent| reducer.reduce(snapshot, intent).0);
        let encoded = serde_json::to_value(&after).unwrap();
        for (id, record) in encoded.as_object().unwrap() {
            prop_assert!(record.get("value").is_some(), "{} has no value", id);
            let ui = record.get("ui").and_then(Value::as_object);
            prop_assert!(ui.is_some(), "{} has no ui", id);
            let ui = ui.unwrap();
            match ui.get("valid") {
                Some(Value::Bool(true)) => prop_assert!(!ui.contains_key("error")),
                Some(Value::Bool(false)) => prop_assert!(
                    ui.get("error").and_then(Value::as_str).map_or(false, |e| !e.trim().is_empty())
                ),
                other => prop_assert!(false, "{} has valid = {:?}", id, other),
            }
        }
        for (id, record) in after.iter() {
            if let Some(groups) = record.value.groups() {
                let mut seen = std::collections::BTreeSet::new();
                for group in groups {
                    prop_assert!(seen.insert(group.id.clone()), "{} repeats group {}", id, group.id);
                }
            }
        }
    }

    #[test]
    fn replaying_the_same_intents_is_deterministic(
        before in snapshot(),
        intents in prop::collection::vec(intent(), 0..8),
    ) {
        let run = || intents
            .iter()
            .cloned()
            .fold(before.clone(), |snapshot, intent| CoreReducer::default().reduce(snapshot, intent).0);
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn mark_valid_is_idempotent(before in snapshot(), id in field_id()) {
        let once = apply(before, FieldIntent::mark_valid(id.clone()));
        let twice = apply(once.clone(), FieldIntent::mark_valid(id));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn reset_store_yields_exactly_its_payload(before in snapshot(), fields in snapshot()) {
        prop_assert_eq!(apply(before, FieldIntent::reset_store(fields.clone())), fields);
    }

    #[test]
    fn removal_is_complete_and_leaves_the_rest_shared(
        before in snapshot(),
        removed in prop::sample::subsequence(FIELD_IDS.to_vec(), 0..=4),
    ) {
        let after = apply(before.clone(), FieldIntent::remove_fields(removed.clone()));
        for id in FIELD_IDS {
            if removed.contains(&id) {
                prop_assert!(!after.contains(id));
            } else if before.contains(id) {
                prop_assert!(after.shares_record_with(&before, id));
            } else {
                prop_assert!(!after.contains(id));
            }
        }
    }

    #[test]
    fn single_field_intents_share_every_other_record(
        reducer in both_policies(),
        before in snapshot(),
        intent in intent(),
    ) {
        let target = intent.field_id().cloned();
        prop_assume!(target.is_some());
        let target = target.unwrap();
        let (after, _) = reducer.reduce(before.clone(), intent);
        for id in before.field_ids().filter(|id| **id != target) {
            prop_assert!(after.shares_record_with(&before, id.as_str()));
        }
    }

    #[test]
    fn unrecognized_intents_change_nothing(before in snapshot(), kind in "[a-z]{1,6}/[a-z]{1,6}") {
        let (after, diagnostic) =
            CoreReducer::default().reduce(before.clone(), FieldIntent::Other(RawIntent::new(kind.clone(), json!({}))));
        prop_assert_eq!(&after, &before);
        for id in FIELD_IDS.iter().filter(|id| before.contains(id)) {
            prop_assert!(after.shares_record_with(&before, id));
        }
        prop_assert_eq!(diagnostic, Some(StoreDiagnostic::UnrecognizedIntent { kind }));
    }

    #[test]
    fn intents_survive_the_wire(intent in intent()) {
        let json = serde_json::to_string(&intent).unwrap();
        prop_assert_eq!(FieldIntent::from_json(&json).unwrap(), intent);
    }
}
