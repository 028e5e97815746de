//! Caller identity types.
//!
//! Almanac does not authenticate callers itself; it trusts the identity
//! established by the fronting auth layer and handed over in headers.
//! This module is the in-process representation of that principal.

use serde::{Deserialize, Serialize};

/// The authenticated identity of a caller.
///
/// Authorization decisions are made against the role set carried by the
/// identity; see [`crate::require_role`].
///
/// # Example
///
/// ```
/// use almanac_core::CallerIdentity;
///
/// let identity = CallerIdentity::user("alice").with_roles(["ROLE_USER"]);
/// assert!(identity.has_role("ROLE_USER"));
/// assert!(!identity.has_role("ROLE_ADMIN"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallerIdentity {
    /// An authenticated user.
    User {
        /// Stable user identifier from the auth layer.
        user_id: String,
        /// Email address, if the auth layer supplied one.
        email: Option<String>,
        /// Display name, if the auth layer supplied one.
        name: Option<String>,
        /// Granted roles (e.g. `ROLE_USER`, `ROLE_ADMIN`).
        roles: Vec<String>,
    },
    /// No credentials were presented.
    Anonymous,
}

impl CallerIdentity {
    /// Creates a user identity with no roles.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
            email: None,
            name: None,
            roles: Vec::new(),
        }
    }

    /// Returns a copy of this identity with the given roles.
    ///
    /// No-op for [`CallerIdentity::Anonymous`].
    #[must_use]
    pub fn with_roles<I>(mut self, roles: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        if let Self::User {
            roles: ref mut slot,
            ..
        } = self
        {
            *slot = roles.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Returns `true` if the identity carries the named role.
    ///
    /// Anonymous callers carry no roles.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        match self {
            Self::User { roles, .. } => roles.iter().any(|r| r == role),
            Self::Anonymous => false,
        }
    }

    /// Returns the roles held by this identity.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        match self {
            Self::User { roles, .. } => roles,
            Self::Anonymous => &[],
        }
    }

    /// Returns `true` if no credentials were presented.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Never returns sensitive information like tokens.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::User { user_id, .. } => format!("user:{user_id}"),
            Self::Anonymous => "anonymous".to_string(),
        }
    }
}

impl Default for CallerIdentity {
    fn default() -> Self {
        Self::Anonymous
    }
}
