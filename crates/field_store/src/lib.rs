//! A normalized, immutable state store for hierarchical form-field trees.
//!
//! The store is a single [`Snapshot`]: a map from [`FieldId`] to
//! [`FieldRecord`], where every record holds the field's `value` and its
//! `ui` state. Snapshots never change. A [`FieldReducer`] turns a snapshot
//! and a [`FieldIntent`] into the next snapshot, sharing every record the
//! intent did not touch.
//!
//! ```rust
//! use field_store::*;
//!
//! let before = apply(Snapshot::new(), FieldIntent::mark_invalid("email", "required").unwrap());
//! let after = apply(before.clone(), FieldIntent::mark_valid("email"));
//!
//! assert_eq!(before.get("email").unwrap().ui.error().map(|e| e.as_str()), Some("required"));
//! assert!(after.get("email").unwrap().ui.is_valid());
//! ```
//!
//! Around the pure reducer sit a few small state-machine wrappers, which
//! compose like this:
//!
//! ```rust
//! use field_store::*;
//!
//! let config = StoreConfig::default();
//! let store = FieldStore::from_config(&config)
//!     .store_effects(config.effect_capacity)
//!     .shared();
//!
//! store.transition(FieldIntent::redraw_map("map"));
//! assert!(store.read(|s| s.snapshot().contains("map")));
//! ```

pub mod cassette;
pub mod combinators;
pub mod config;
pub mod decorate;
pub mod encoder;
pub mod error;
pub mod ids;
pub mod intent;
pub mod record;
pub mod recording;
pub mod reducer;
pub mod share;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod ui;

pub use cassette::*;
pub use combinators::*;
pub use config::*;
pub use decorate::*;
pub use encoder::*;
pub use error::*;
pub use ids::*;
pub use intent::*;
pub use record::*;
pub use recording::*;
pub use reducer::*;
pub use share::*;
pub use snapshot::*;
pub use state::*;
pub use store::*;
pub use ui::*;
