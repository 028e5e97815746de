//! Handler registration and dispatch.
//!
//! Handlers are async functions registered against an operation id.
//! Each handler receives the [`RequestContext`] and a [`RawRequest`]
//! carrying the query string and collected body; typed extraction is
//! done inside the handler via [`RawRequest::query`] and
//! [`RawRequest::json`], since the resource surface mixes query-string
//! arguments and JSON bodies per operation.
//!
//! # Example
//!
//! ```rust,ignore
//! use almanac_server::{HandlerError, HandlerRegistry, RawRequest};
//! use almanac_core::RequestContext;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct IdQuery { id: i64 }
//!
//! async fn get_book(ctx: RequestContext, req: RawRequest) -> Result<Book, HandlerError> {
//!     let IdQuery { id } = req.query()?;
//!     // ...
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("getBook", get_book);
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use almanac_core::{ApiError, RequestContext};

/// Type alias for boxed handler result.
pub type BoxedHandlerResult = Pin<Box<dyn Future<Output = Result<Bytes, HandlerError>> + Send>>;

/// A type-erased handler function.
pub type ErasedHandler =
    Arc<dyn Fn(RequestContext, RawRequest) -> BoxedHandlerResult + Send + Sync>;

/// The raw inputs of a matched request: query string and body bytes.
///
/// Typed extraction happens in the handler, not at registration time,
/// because different operations read different parts of the request.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    /// Raw query string, without the leading `?`
    query: String,

    /// Collected request body
    body: Bytes,
}

impl RawRequest {
    /// Creates a raw request from a query string and body.
    #[must_use]
    pub fn new(query: impl Into<String>, body: Bytes) -> Self {
        Self {
            query: query.into(),
            body,
        }
    }

    /// Returns the raw query string.
    #[must_use]
    pub fn query_str(&self) -> &str {
        &self.query
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the query string into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::BadRequest`] if the query string cannot
    /// be deserialized (missing or malformed parameters).
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_urlencoded::from_str(&self.query)
            .map_err(|e| HandlerError::BadRequest(format!("Invalid query parameters: {e}")))
    }

    /// Deserializes the JSON body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::BadRequest`] if the body is not valid
    /// JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| HandlerError::BadRequest(format!("Invalid request body: {e}")))
    }
}

/// Handler error type.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The request inputs could not be parsed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Response serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The handler returned an API error.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Registry for operation handlers.
///
/// Maps operation ids to type-erased handler functions and serializes
/// their responses to JSON.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, ErasedHandler>,
}

impl HandlerRegistry {
    /// Creates a new empty handler registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler for an operation.
    ///
    /// The handler is an async function taking the request context and
    /// the raw request, returning a serializable response or a
    /// [`HandlerError`].
    pub fn register<Res, F, Fut>(&mut self, operation_id: impl Into<String>, handler: F)
    where
        Res: Serialize + Send + 'static,
        F: Fn(RequestContext, RawRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, HandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |ctx: RequestContext, req: RawRequest| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let response = handler(ctx, req).await?;

                let bytes = serde_json::to_vec(&response)
                    .map_err(|e| HandlerError::Serialization(e.to_string()))?;

                Ok(Bytes::from(bytes))
            })
        });

        self.handlers.insert(operation_id.into(), erased);
    }

    /// Checks if a handler is registered for an operation.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns an iterator over registered operation ids.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Invokes a handler for the given operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler is not registered or execution
    /// fails.
    pub async fn invoke(
        &self,
        operation_id: &str,
        ctx: RequestContext,
        req: RawRequest,
    ) -> Result<Bytes, InvokeError> {
        let handler = self
            .handlers
            .get(operation_id)
            .ok_or_else(|| InvokeError::HandlerNotFound(operation_id.to_string()))?;

        handler(ctx, req).await.map_err(InvokeError::HandlerError)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Error returned when invoking a handler fails.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// No handler registered for the operation.
    #[error("No handler registered for operation: {0}")]
    HandlerNotFound(String),

    /// Handler execution failed.
    #[error("Handler error: {0}")]
    HandlerError(#[from] HandlerError),
}
