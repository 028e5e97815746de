//! Role tiers and the authorization guard.
//!
//! Authorization in Almanac is an explicit function call, invoked as the
//! first step of every resource operation. There is no framework-level
//! interception: an operation that forgets the guard compiles, but its
//! tests fail the 403 properties.
//!
//! Two tiers exist. Reads require [`Role::User`]; writes require
//! [`Role::Admin`]. The check is stateless and evaluated per request.

use crate::error::ApiError;
use crate::identity::CallerIdentity;
use serde::{Deserialize, Serialize};

/// Role name granted to every authenticated user.
pub const ROLE_USER: &str = "ROLE_USER";

/// Role name granted to administrators.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// The two capability tiers gating resource operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Read tier: list and get-by-id.
    User,
    /// Write tier: create, update, delete.
    Admin,
}

impl Role {
    /// Returns the role name as carried in a caller's role set.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => ROLE_USER,
            Self::Admin => ROLE_ADMIN,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that the caller holds the required role tier.
///
/// [`Role::User`] is satisfied by either `ROLE_USER` or `ROLE_ADMIN`;
/// [`Role::Admin`] only by `ROLE_ADMIN`. Anonymous callers always fail.
///
/// Returns [`ApiError::Forbidden`] on denial, so callers short-circuit
/// with `?` before touching the repository.
///
/// # Example
///
/// ```
/// use almanac_core::{require_role, CallerIdentity, Role};
///
/// let admin = CallerIdentity::user("a").with_roles(["ROLE_ADMIN"]);
/// assert!(require_role(&admin, Role::Admin).is_ok());
/// assert!(require_role(&admin, Role::User).is_ok());
///
/// let anon = CallerIdentity::Anonymous;
/// assert!(require_role(&anon, Role::User).is_err());
/// ```
pub fn require_role(identity: &CallerIdentity, role: Role) -> Result<(), ApiError> {
    if identity.is_anonymous() {
        tracing::debug!(required = %role, "Anonymous caller denied");
        return Err(ApiError::forbidden(
            "Full authentication is required to access this resource",
        ));
    }

    let allowed = match role {
        Role::User => identity.has_role(ROLE_USER) || identity.has_role(ROLE_ADMIN),
        Role::Admin => identity.has_role(ROLE_ADMIN),
    };

    if allowed {
        Ok(())
    } else {
        tracing::debug!(
            caller = %identity.log_id(),
            required = %role,
            roles = ?identity.roles(),
            "Caller lacks required role"
        );
        Err(ApiError::forbidden("Access is denied"))
    }
}
