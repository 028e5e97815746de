//! # Almanac Server
//!
//! Hyper-based HTTP server for the Almanac service.
//!
//! The server owns the transport-level concerns the resource
//! controllers stay out of: TCP accept loop, request routing, body
//! collection with timeouts, identity extraction from trusted proxy
//! headers, handler dispatch, error-to-response translation, and
//! graceful shutdown.
//!
//! Handlers are registered against operation ids in a
//! [`HandlerRegistry`] and matched by the [`Router`]; the whole request
//! pipeline is also reachable in-process via [`Server::oneshot`], which
//! is what the test client uses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod handler;
mod identity;
mod router;
mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use handler::{HandlerError, HandlerRegistry, RawRequest};
pub use identity::{identity_from_headers, EMAIL_HEADER, NAME_HEADER, ROLES_HEADER, USER_ID_HEADER};
pub use router::{RouteMatch, Router};
pub use server::{HttpResponse, ResponseBody, Server, ServerBuilder, ServerError};
pub use shutdown::ShutdownSignal;
