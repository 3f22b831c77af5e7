use crate::*;

/// Holds the current [`Snapshot`] and the reducer that moves it forward.
///
/// This is the only mutable thing in the crate: each transition replaces
/// the held snapshot with the one the reducer returns. Snapshots handed out
/// earlier are unaffected.
#[derive(Clone, Debug, Default)]
pub struct FieldStore<R = CoreReducer> {
    snapshot: Snapshot,
    reducer: R,
}

impl FieldStore<CoreReducer> {
    /// An empty store whose reducer follows the configured policies.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(CoreReducer::new(config.missing_field), Snapshot::new())
    }
}

impl<R: FieldReducer> FieldStore<R> {
    pub fn new(reducer: R, snapshot: Snapshot) -> Self {
        Self { snapshot, reducer }
    }

    /// The current snapshot. Cheap: only a reference count is bumped.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    /// Decode an intent from its JSON wire form and dispatch it.
    /// A malformed payload is an error and leaves the store untouched.
    pub fn dispatch_json(&mut self, json: &str) -> StoreResult<Option<StoreDiagnostic>> {
        let intent = FieldIntent::from_json(json)?;
        Ok(self.transition(intent))
    }
}

impl<R: FieldReducer> State for FieldStore<R> {
    type Action = FieldIntent;
    type Effect = Option<StoreDiagnostic>;

    fn transition(&mut self, intent: Self::Action) -> Self::Effect {
        let reducer = &self.reducer;
        update_take(&mut self.snapshot, |snapshot| reducer.reduce(snapshot, intent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn earlier_snapshots_are_unaffected() {
        let mut store: FieldStore = FieldStore::default();
        store.transition(FieldIntent::redraw_map("map"));
        let before = store.snapshot();
        store.transition(FieldIntent::mark_invalid("map", "bad").unwrap());
        assert!(before.get("map").unwrap().ui.is_valid());
        assert!(!store.snapshot().get("map").unwrap().ui.is_valid());
    }

    #[test]
    fn config_policy_reaches_the_reducer() {
        let config = StoreConfig {
            missing_field: MissingFieldPolicy::Ignore,
            ..Default::default()
        };
        let mut store = FieldStore::from_config(&config);
        let effect = store.transition(FieldIntent::redraw_map("map"));
        assert!(matches!(effect, Some(StoreDiagnostic::MissingField { .. })));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn malformed_json_is_rejected_before_dispatch() {
        let mut store: FieldStore = FieldStore::default();
        let err = store
            .dispatch_json(r#"{"type": "mark-field-invalid", "payload": {"fieldId": "f1"}}"#)
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedPayload { kind, .. } if kind == "mark-field-invalid"));
        assert!(store.snapshot().is_empty());

        assert_eq!(
            store
                .dispatch_json(r#"{"type": "redraw-map", "payload": {"fieldId": "m"}}"#)
                .unwrap(),
            None
        );
        assert_eq!(store.snapshot().get("m").unwrap().ui.redraw_map, Some(true));
    }
}
