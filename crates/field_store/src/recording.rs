use std::sync::Arc;

use crate::*;

/// Records every action to a [`Cassette`] before passing it on to the wrapped state.
///
/// A failure to record is logged and otherwise ignored: the transition
/// still happens, the journal just has a gap.
#[derive(Debug, derive_more::Deref)]
pub struct RecordActions<S, C = FileCassette> {
    #[deref]
    state: S,
    cassette: Arc<C>,
}

impl<S, C> State for RecordActions<S, C>
where
    S: State,
    C: Cassette<S::Action>,
{
    type Action = S::Action;
    type Effect = S::Effect;

    fn transition(&mut self, action: Self::Action) -> Self::Effect {
        if let Err(err) = self.cassette.record_action(&action) {
            tracing::error!(?err, "failed to record action");
        }
        self.state.transition(action)
    }
}

impl<S, C> RecordActions<S, C>
where
    S: State,
    C: Cassette<S::Action>,
{
    pub fn new(cassette: C, state: S) -> StoreResult<Self> {
        cassette.initialize()?;
        Ok(Self {
            cassette: Arc::new(cassette),
            state,
        })
    }

    pub fn cassette(&self) -> &C {
        &self.cassette
    }

    pub fn into_inner(self) -> S {
        self.state
    }
}
