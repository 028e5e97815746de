//! # Almanac Store
//!
//! The persistence port consumed by every resource controller.
//!
//! The port is two traits: [`Entity`], implemented by each record kind,
//! and [`Repository`], implemented by each backing store. Controllers
//! depend only on these traits; the store is authoritative for record
//! state and identifier uniqueness.
//!
//! [`MemoryRepository`] is the in-process implementation used by the
//! binary and the test suite.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;

pub use memory::MemoryRepository;

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use thiserror::Error;

/// Result type alias using [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by a repository backend.
///
/// Absence of a record is NOT an error; [`Repository::find_by_id`]
/// represents it as `None`. This type covers backend faults only.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store failed (connection, I/O, constraint).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A persistable record kind.
///
/// Records are passive data holders: an optional identifier plus a
/// fixed set of simple-valued fields. The identifier is absent until
/// first saved, assigned by the repository, and immutable thereafter.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Display name of the kind, used in messages (e.g. "Book").
    const KIND: &'static str;

    /// Returns the identifier, or `None` if the record was never saved.
    fn id(&self) -> Option<i64>;

    /// Sets the identifier. Called by the repository on first save.
    fn set_id(&mut self, id: i64);
}

/// The storage abstraction the controllers depend on.
///
/// Whether a call is served from memory or a network round-trip is the
/// implementation's business; controllers only await the future.
pub trait Repository<E: Entity>: Send + Sync + 'static {
    /// Returns every record of the kind.
    ///
    /// Order is unspecified but stable within a snapshot; controllers
    /// return it unmodified.
    fn find_all(&self) -> impl Future<Output = StoreResult<Vec<E>>> + Send;

    /// Returns the record with the given identifier, if present.
    fn find_by_id(&self, id: i64) -> impl Future<Output = StoreResult<Option<E>>> + Send;

    /// Persists a new or modified record and returns the stored value.
    ///
    /// A record without an identifier is assigned one; a record with an
    /// identifier replaces the stored value in place.
    fn save(&self, entity: E) -> impl Future<Output = StoreResult<E>> + Send;

    /// Removes the record from the store.
    fn delete(&self, entity: &E) -> impl Future<Output = StoreResult<()>> + Send;
}
