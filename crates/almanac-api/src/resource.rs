//! The resource abstraction shared by every CRUD surface.

use almanac_store::Entity;
use serde::de::DeserializeOwned;

/// A record kind exposed through the generic CRUD surface.
///
/// A resource is an [`Entity`] plus the pieces the HTTP layer needs:
/// the base path it is mounted at, the stem used to derive operation
/// ids (`list{STEM}`, `get{STEM}`, ...), and a payload type carrying
/// every caller-writable field.
///
/// The payload deliberately excludes the identifier. Creates build a
/// fresh record from a payload; updates overwrite every writable field
/// of an existing record with the payload, leaving the identifier
/// untouched.
pub trait Resource: Entity {
    /// Path prefix the resource is mounted at (e.g. `/api/book`).
    const BASE_PATH: &'static str;

    /// Stem used to derive operation ids (e.g. `Book` for `getBook`).
    const OPERATION_STEM: &'static str;

    /// The caller-writable fields of the resource.
    ///
    /// Deserializable from both query-string arguments (creates) and
    /// JSON bodies (updates).
    type Payload: DeserializeOwned + Send + 'static;

    /// Builds a new record from a payload, with no identifier assigned.
    fn from_payload(payload: Self::Payload) -> Self;

    /// Overwrites every writable field with the payload's values.
    ///
    /// The identifier is not touched.
    fn apply(&mut self, payload: Self::Payload);
}
