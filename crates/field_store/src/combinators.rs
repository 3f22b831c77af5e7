//! Wrapper types to add functionality and behavior to a [`State`]

use std::collections::VecDeque;
use std::marker::PhantomData;

use super::*;

/// Every time an Effect is generated from this State, store it in a bounded queue.
/// Once `capacity` effects are held, the oldest one is dropped to make room.
/// Converts the State's Effect type to `()`
#[derive(Debug, derive_more::Deref, derive_more::DerefMut)]
pub struct StoreEffects<S: State> {
    #[deref]
    #[deref_mut]
    state: S,
    effects: VecDeque<S::Effect>,
    capacity: usize,
}

impl<S: State> State for StoreEffects<S> {
    type Action = S::Action;
    type Effect = ();

    fn transition(&mut self, t: Self::Action) -> Self::Effect {
        let eff = self.state.transition(t);
        if self.capacity == 0 {
            return;
        }
        if self.effects.len() == self.capacity {
            self.effects.pop_front();
        }
        self.effects.push_back(eff);
    }
}

impl<S: State> StoreEffects<S> {
    pub fn new(state: S, capacity: usize) -> Self {
        Self {
            state,
            effects: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Accessor for the stored effects, oldest first.
    pub fn effects(&self) -> &VecDeque<S::Effect> {
        &self.effects
    }

    /// Drain and return all effects.
    pub fn drain_effects(&mut self) -> Vec<S::Effect> {
        self.effects.drain(..).collect()
    }

    pub fn into_inner(self) -> S {
        self.state
    }
}

/// Run every Effect through `runner` as soon as it is produced,
/// returning whatever the runner returns.
#[derive(derive_more::Deref, derive_more::DerefMut)]
pub struct RunEffects<S, Ret, Runner>
where
    S: State,
    Runner: Fn(S::Effect) -> Ret,
{
    #[deref]
    #[deref_mut]
    state: S,
    runner: Runner,
    ret: PhantomData<Ret>,
}

impl<S, Ret, Runner> State for RunEffects<S, Ret, Runner>
where
    S: State,
    Ret: Eq,
    Runner: Fn(S::Effect) -> Ret,
{
    type Action = S::Action;
    type Effect = Ret;

    fn transition(&mut self, t: Self::Action) -> Self::Effect {
        (self.runner)(self.state.transition(t))
    }
}

impl<S, Ret, Runner> RunEffects<S, Ret, Runner>
where
    S: State,
    Runner: Fn(S::Effect) -> Ret,
{
    pub fn new(state: S, runner: Runner) -> Self {
        Self {
            state,
            runner,
            ret: PhantomData,
        }
    }
}
