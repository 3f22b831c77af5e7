use crate::*;

/// A model of an effectful state machine.
///
/// The state can only be mutated through an Action value, and each Action
/// produces an Effect. The Effect is not acted upon here, it is handed back
/// to whoever drove the transition, or to a wrapper like [`RunEffects`].
pub trait State {
    /// The type which represents a change to the state
    type Action;

    /// What a transition reports back to the outside world.
    ///
    /// Effects must be produced deterministically: replaying the same actions
    /// from the same starting state yields the same effects. The `Eq` bound
    /// keeps that checkable.
    type Effect: Eq;

    /// The definition of how an incoming Action modifies the State, and what Effect it produces.
    fn transition(&mut self, action: Self::Action) -> Self::Effect;
}

/// Extensions to make it easier to apply the built-in combinators to States
pub trait StateExt: State + Sized {
    /// Wrap in [`Share`]
    fn shared(self) -> Share<Self> {
        Share::new(self)
    }

    /// Wrap in [`StoreEffects`], keeping at most `capacity` effects.
    fn store_effects(self, capacity: usize) -> StoreEffects<Self> {
        StoreEffects::new(self, capacity)
    }

    /// Wrap in [`RunEffects`]
    fn run_effects<Ret, Runner>(self, runner: Runner) -> RunEffects<Self, Ret, Runner>
    where
        Runner: Fn(Self::Effect) -> Ret,
    {
        RunEffects::new(self, runner)
    }

    /// Wrap in [`RecordActions`], recording every action to the cassette before it is applied.
    fn record<C>(self, cassette: C) -> StoreResult<RecordActions<Self, C>>
    where
        C: Cassette<Self::Action>,
    {
        RecordActions::new(cassette, self)
    }
}

impl<S> StateExt for S where S: State + Sized {}

/// Convenience for updating state by consuming the current value and returning the next one.
pub fn update_take<S, E>(s: &mut S, f: impl FnOnce(S) -> (S, E)) -> E
where
    S: Default,
{
    let (next, fx) = f(std::mem::take(s));
    *s = next;
    fx
}
