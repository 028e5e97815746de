//! # Almanac
//!
//! Main facade crate for the Almanac catalog service: books, parks,
//! and restaurants behind a uniform CRUD HTTP surface.
//!
//! Reads require the user tier, mutations require admin; identity is
//! taken from trusted proxy headers. [`build_server`] wires the three
//! resource kinds over in-memory stores into a ready-to-run
//! [`Server`].
//!
//! # Example
//!
//! ```rust,no_run
//! use almanac::{build_server, AppConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! let server = build_server(&config);
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;

use std::sync::Arc;

use almanac_api::{register_resource, ResourceController};
use almanac_api::resources::{Book, Park, Restaurant};
use almanac_server::{HandlerRegistry, Router};
use almanac_store::MemoryRepository;

pub use almanac_api::{GenericMessage, Resource};
pub use almanac_core::{
    require_role, ApiError, ApiResult, CallerIdentity, ErrorBody, RequestContext, RequestId, Role,
};
pub use almanac_server::{Server, ServerError, ShutdownSignal};
pub use config::{AppConfig, ConfigError};
pub use logging::{init_logging, LoggingError};

/// Builds a server hosting all three resource kinds over fresh
/// in-memory stores.
#[must_use]
pub fn build_server(config: &AppConfig) -> Server {
    let mut router = Router::new();
    let mut registry = HandlerRegistry::new();

    let books: ResourceController<Book, MemoryRepository<Book>> =
        ResourceController::new(Arc::new(MemoryRepository::new()));
    let parks: ResourceController<Park, MemoryRepository<Park>> =
        ResourceController::new(Arc::new(MemoryRepository::new()));
    let restaurants: ResourceController<Restaurant, MemoryRepository<Restaurant>> =
        ResourceController::new(Arc::new(MemoryRepository::new()));

    register_resource(&mut router, &mut registry, &books);
    register_resource(&mut router, &mut registry, &parks);
    register_resource(&mut router, &mut registry, &restaurants);

    Server::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(config.server.shutdown_timeout())
        .request_timeout(config.server.request_timeout())
        .router(router)
        .handlers(registry)
        .build()
}
