//! Generic CRUD controller.
//!
//! One controller implementation serves every resource kind. Each
//! operation runs the same sequence: authorization check first, then
//! existence check where an identifier is involved, then the store
//! operation. Failures surface as [`ApiError`] and propagate with `?`
//! to the server boundary.
//!
//! Read operations require the user tier; mutations require admin.

use std::sync::Arc;

use almanac_core::{require_role, ApiError, ApiResult, RequestContext, Role};
use almanac_store::{Repository, StoreError};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// Plain message body returned by operations without a record to return.
///
/// Serializes as `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericMessage {
    /// Human-readable outcome description.
    pub message: String,
}

impl GenericMessage {
    /// Creates a message body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The fixed confirmation for a successful delete.
    #[must_use]
    pub fn deleted(kind: &str, id: i64) -> Self {
        Self::new(format!("{kind} with id {id} deleted"))
    }
}

/// CRUD controller for a single resource kind.
///
/// Generic over the resource and its repository; the HTTP layer wires
/// one controller per kind. Cloning shares the underlying repository.
#[derive(Debug)]
pub struct ResourceController<E, R> {
    repository: Arc<R>,
    _marker: std::marker::PhantomData<fn() -> E>,
}

impl<E, R> Clone for ResourceController<E, R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<E, R> ResourceController<E, R>
where
    E: Resource,
    R: Repository<E>,
{
    /// Creates a controller backed by the given repository.
    #[must_use]
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns all records, in insertion order.
    ///
    /// Requires the user tier.
    pub async fn list(&self, ctx: &RequestContext) -> ApiResult<Vec<E>> {
        require_role(ctx.identity(), Role::User)?;
        self.repository.find_all().await.map_err(store_error)
    }

    /// Returns the record with the given identifier.
    ///
    /// Requires the user tier. Returns [`ApiError::NotFound`] if no
    /// record has the identifier.
    pub async fn get(&self, ctx: &RequestContext, id: i64) -> ApiResult<E> {
        require_role(ctx.identity(), Role::User)?;
        self.repository
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| ApiError::not_found(E::KIND, id))
    }

    /// Creates a new record from the payload.
    ///
    /// Requires admin. The store assigns the identifier; the saved
    /// record is returned.
    pub async fn create(&self, ctx: &RequestContext, payload: E::Payload) -> ApiResult<E> {
        require_role(ctx.identity(), Role::Admin)?;
        let record = E::from_payload(payload);
        let saved = self.repository.save(record).await.map_err(store_error)?;
        tracing::info!(kind = E::KIND, id = ?saved.id(), "Record created");
        Ok(saved)
    }

    /// Replaces the writable fields of an existing record.
    ///
    /// Requires admin. The existence check runs after the authorization
    /// check, so an unauthorized caller learns nothing about which
    /// identifiers exist.
    pub async fn update(&self, ctx: &RequestContext, id: i64, payload: E::Payload) -> ApiResult<E> {
        require_role(ctx.identity(), Role::Admin)?;
        let mut record = self
            .repository
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| ApiError::not_found(E::KIND, id))?;

        record.apply(payload);
        let saved = self.repository.save(record).await.map_err(store_error)?;
        tracing::info!(kind = E::KIND, id, "Record updated");
        Ok(saved)
    }

    /// Deletes the record with the given identifier.
    ///
    /// Requires admin. Returns a confirmation message; deleting an
    /// absent identifier is [`ApiError::NotFound`].
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> ApiResult<GenericMessage> {
        require_role(ctx.identity(), Role::Admin)?;
        let record = self
            .repository
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| ApiError::not_found(E::KIND, id))?;

        self.repository.delete(&record).await.map_err(store_error)?;
        tracing::info!(kind = E::KIND, id, "Record deleted");
        Ok(GenericMessage::deleted(E::KIND, id))
    }
}

/// Maps a store failure into an opaque internal error.
///
/// The backend detail goes to the logs, not the client.
fn store_error(err: StoreError) -> ApiError {
    tracing::error!("Store operation failed: {}", err);
    ApiError::internal("Internal server error")
}
