//! Identity extraction from trusted proxy headers.
//!
//! Almanac sits behind an auth layer that authenticates the caller and
//! forwards the resolved principal in headers. The server trusts those
//! headers; a request without them is anonymous.

use almanac_core::CallerIdentity;
use http::HeaderMap;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-auth-user";

/// Header carrying the caller's roles, comma-separated.
pub const ROLES_HEADER: &str = "x-auth-roles";

/// Optional header carrying the caller's email.
pub const EMAIL_HEADER: &str = "x-auth-email";

/// Optional header carrying the caller's display name.
pub const NAME_HEADER: &str = "x-auth-name";

/// Extracts the caller identity from request headers.
///
/// A request without a user id header (or with one that is not valid
/// UTF-8) is [`CallerIdentity::Anonymous`]. Roles are read from
/// [`ROLES_HEADER`] as a comma-separated list; blank entries are
/// dropped.
#[must_use]
pub fn identity_from_headers(headers: &HeaderMap) -> CallerIdentity {
    let Some(user_id) = header_str(headers, USER_ID_HEADER) else {
        return CallerIdentity::Anonymous;
    };

    let roles: Vec<String> = header_str(headers, ROLES_HEADER)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();

    CallerIdentity::User {
        user_id: user_id.to_string(),
        email: header_str(headers, EMAIL_HEADER).map(ToString::to_string),
        name: header_str(headers, NAME_HEADER).map(ToString::to_string),
        roles,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}
