//! In-memory repository implementation.

use crate::{Entity, Repository, StoreResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

/// An in-memory [`Repository`] backed by a `RwLock<Vec<E>>`.
///
/// Identifiers are assigned from an atomic counter starting at 1.
/// `find_all` yields records in insertion order. The repository is not
/// itself `Clone`; share it behind an `Arc`.
///
/// # Example
///
/// ```ignore
/// let repo: MemoryRepository<Book> = MemoryRepository::new();
/// let saved = repo.save(book).await?;
/// assert!(saved.id().is_some());
/// ```
#[derive(Debug)]
pub struct MemoryRepository<E> {
    records: RwLock<Vec<E>>,
    next_id: AtomicI64,
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryRepository<E> {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Creates a repository pre-populated with the given records.
    ///
    /// Records without identifiers are assigned one; the counter is
    /// advanced past the highest identifier seen, so later saves never
    /// collide with seeded ids.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = E>) -> Self {
        let repo = Self::new();
        {
            let mut slot = repo.records.write();
            for mut record in records {
                match record.id() {
                    Some(id) => {
                        repo.next_id.fetch_max(id + 1, Ordering::SeqCst);
                    }
                    None => {
                        let id = repo.next_id.fetch_add(1, Ordering::SeqCst);
                        record.set_id(id);
                    }
                }
                slot.push(record);
            }
        }
        repo
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns `true` if the repository holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn find_all(&self) -> StoreResult<Vec<E>> {
        Ok(self.records.read().clone())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<E>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned())
    }

    async fn save(&self, mut entity: E) -> StoreResult<E> {
        let mut records = self.records.write();
        match entity.id() {
            Some(id) => {
                if let Some(slot) = records.iter_mut().find(|r| r.id() == Some(id)) {
                    *slot = entity.clone();
                } else {
                    // Caller supplied an id the store has never seen;
                    // honor it and keep the counter ahead of it.
                    self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                    records.push(entity.clone());
                }
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                entity.set_id(id);
                records.push(entity.clone());
            }
        }
        tracing::debug!(kind = E::KIND, id = ?entity.id(), "Record saved");
        Ok(entity)
    }

    async fn delete(&self, entity: &E) -> StoreResult<()> {
        let mut records = self.records.write();
        records.retain(|r| r.id() != entity.id());
        tracing::debug!(kind = E::KIND, id = ?entity.id(), "Record deleted");
        Ok(())
    }
}
