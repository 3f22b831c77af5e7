use std::sync::Arc;

use parking_lot::RwLock;

use crate::*;

/// Anything that can hand out the [`Snapshot`] it currently holds.
///
/// Implemented by [`FieldStore`] and passed through by every wrapper, so a
/// reader never has to know how the store was composed.
pub trait SnapshotSource {
    fn snapshot(&self) -> Snapshot;
}

impl<R: FieldReducer> SnapshotSource for FieldStore<R> {
    fn snapshot(&self) -> Snapshot {
        FieldStore::snapshot(self)
    }
}

impl<S: State + SnapshotSource> SnapshotSource for StoreEffects<S> {
    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }
}

impl<S: State + SnapshotSource, Ret, Runner> SnapshotSource for RunEffects<S, Ret, Runner>
where
    Runner: Fn(S::Effect) -> Ret,
{
    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }
}

impl<S: SnapshotSource, C> SnapshotSource for RecordActions<S, C> {
    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }
}

/// A store behind a lock, for hosts that dispatch from several threads.
///
/// Clones refer to the same store. Dispatches are serialized by the write
/// lock; readers take the current snapshot and drop the lock straight away,
/// so a long read never holds up the next dispatch.
#[derive(Default)]
pub struct Share<S>(Arc<RwLock<S>>);

impl<S> Clone for Share<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<S: State> Share<S> {
    pub fn new(s: S) -> Self {
        Self(Arc::new(RwLock::new(s)))
    }

    /// Look at the wrapped store under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.0.read())
    }

    pub fn transition(&self, action: S::Action) -> S::Effect {
        self.0.write().transition(action)
    }

    /// Dispatch, then look at the result before any other dispatch can land.
    pub fn transition_with<T>(&self, action: S::Action, f: impl FnOnce(&S) -> T) -> (T, S::Effect) {
        let mut store = self.0.write();
        let effect = store.transition(action);
        (f(&store), effect)
    }
}

impl<S: State<Action = FieldIntent>> Share<S> {
    /// Decode an intent from its JSON wire form and dispatch it.
    /// Decoding happens before the lock is taken.
    pub fn dispatch_json(&self, json: &str) -> StoreResult<S::Effect> {
        let intent = FieldIntent::from_json(json)?;
        Ok(self.transition(intent))
    }
}

impl<S: State + SnapshotSource> Share<S> {
    /// The current snapshot. The lock is held only long enough to bump a
    /// reference count.
    pub fn snapshot(&self) -> Snapshot {
        self.0.read().snapshot()
    }
}

impl<S: State> State for Share<S> {
    type Action = S::Action;
    type Effect = S::Effect;

    fn transition(&mut self, action: Self::Action) -> Self::Effect {
        Share::transition(self, action)
    }
}

impl<S: State + SnapshotSource> std::fmt::Debug for Share<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Share").field(&self.snapshot()).finish()
    }
}
