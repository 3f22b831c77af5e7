//! Explicit composition of reducers.
//!
//! A decorator is a plain function that receives the inner reducer along
//! with the snapshot and intent, and decides what to do with them:
//! delegate, adjust the input or the output, or handle an intent kind
//! the inner reducer does not know about.
//!
//! ```rust
//! use field_store::*;
//!
//! let reducer = CoreReducer::default().decorate(|inner: &CoreReducer, snapshot, intent| {
//!     match intent {
//!         FieldIntent::Other(raw) if raw.kind == "clear" => (Snapshot::new(), None),
//!         intent => inner.reduce(snapshot, intent),
//!     }
//! });
//!
//! let cleared = reducer
//!     .reduce(
//!         apply(Snapshot::new(), FieldIntent::redraw_map("map")),
//!         FieldIntent::Other(RawIntent::new("clear", serde_json::Value::Null)),
//!     )
//!     .0;
//! assert!(cleared.is_empty());
//! ```

use crate::intent::FieldIntent;
use crate::reducer::{FieldReducer, Reduction};
use crate::snapshot::Snapshot;

/// An inner reducer wrapped by a decorating function.
#[derive(Clone, Debug)]
pub struct Decorated<R, F> {
    inner: R,
    decorator: F,
}

impl<R, F> Decorated<R, F>
where
    R: FieldReducer,
    F: Fn(&R, Snapshot, FieldIntent) -> Reduction,
{
    pub fn new(inner: R, decorator: F) -> Self {
        Self { inner, decorator }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R, F> FieldReducer for Decorated<R, F>
where
    R: FieldReducer,
    F: Fn(&R, Snapshot, FieldIntent) -> Reduction,
{
    fn reduce(&self, snapshot: Snapshot, intent: FieldIntent) -> Reduction {
        (self.decorator)(&self.inner, snapshot, intent)
    }
}

/// Extensions for composing [`FieldReducer`]s.
pub trait ReducerExt: FieldReducer + Sized {
    /// Wrap this reducer in a decorator. Decorating a [`Decorated`] stacks:
    /// the outermost decorator sees every intent first.
    fn decorate<F>(self, decorator: F) -> Decorated<Self, F>
    where
        F: Fn(&Self, Snapshot, FieldIntent) -> Reduction,
    {
        Decorated::new(self, decorator)
    }
}

impl<R> ReducerExt for R where R: FieldReducer + Sized {}
