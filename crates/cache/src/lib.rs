//! Local store for shelfsync collections.
//!
//! The store is a cache of what the remote services last told us, not a
//! source of truth: delete the database and the next load refreshes
//! everything from the remotes.
//!
//! # Architecture
//! - **Books**: one row per record per source, keyed by `(source, id)` and
//!   accessed through a [`Repository`] scoped to a single source.
//! - **Sync times**: one timestamp per named collection, recording when a
//!   full remote refresh last completed ([`SyncTimes`]).
//!
//! Everything else talks to the [`LocalStore`] and [`SyncMarkerStore`]
//! traits, so tests can swap in the in-memory stores from the `mock`
//! feature.

mod db;
pub mod error;
mod markers;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod models;
mod repo;
mod store;

pub use crate::db::Database;
pub use crate::markers::SyncTimes;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::{MemoryMarkers, MemoryStore};
pub use crate::repo::Repository;
pub use crate::store::{LocalStore, SyncMarkerStore, stored_order};
