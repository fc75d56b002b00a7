//! The Pantry recipe store.
//!
//! [`RecipeStore`] owns the in-memory recipe collection and the active
//! category filter. Every mutation is applied in memory and then persisted as
//! a whole through a [`pantry_storage::RecipeStorage`] before the call
//! returns.
//!
//! # Lifecycle
//!
//! `Uninitialized → Loading → Ready`. Every load ends in `Ready`: an absent
//! or unreadable record is replaced by the bundled sample recipes, which are
//! persisted right away. If that first save fails the error is returned but
//! the seed stays installed. `reload` may be called in any phase; overlapping
//! reloads are resolved by a generation counter so only the latest one lands.
//!
//! # Concurrency
//!
//! Mutations hold a single-writer async lock across mutate-then-persist, so
//! concurrent callers are applied one at a time in lock order and every
//! caller observes its own mutation persisted (or the persistence failure)
//! when its call returns. Reads are synchronous snapshots. Observers can
//! [`subscribe`](RecipeStore::subscribe) to a `watch` channel of
//! [`StoreSnapshot`]s.
//!
//! # Failure semantics
//!
//! A failed save is returned to the caller as [`StoreError::Persist`], but
//! the in-memory mutation is kept. The view stays consistent with itself;
//! at worst the write is lost on the next reload.

pub mod config;
pub mod error;
pub mod snapshot;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use snapshot::{filter_recipes, StorePhase, StoreSnapshot};
pub use store::{LoadOutcome, RecipeStore};
