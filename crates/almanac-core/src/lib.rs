//! # Almanac Core
//!
//! Core types shared across the Almanac service:
//!
//! - [`RequestContext`] - Per-request context carrying identity and metadata
//! - [`RequestId`] - UUID v7 request identifier
//! - [`CallerIdentity`] - Authenticated caller identity (User, Anonymous)
//! - [`Role`] / [`require_role`] - Role tiers and the authorization guard
//! - [`ApiError`] - Standard error type with HTTP translation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod error;
mod guard;
mod identity;

pub use context::{RequestContext, RequestId};
pub use error::{ApiError, ApiResult, ErrorBody};
pub use guard::{require_role, Role, ROLE_ADMIN, ROLE_USER};
pub use identity::CallerIdentity;
