//! # Almanac API
//!
//! Resource definitions and the generic CRUD controller.
//!
//! Each resource kind (book, park, restaurant) is an [`Entity`] plus a
//! [`Resource`] implementation describing its HTTP surface. A single
//! [`ResourceController`] serves all kinds; [`register_resource`] wires
//! the five CRUD operations of one kind into the server's router and
//! handler registry.
//!
//! [`Entity`]: almanac_store::Entity

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod controller;
mod resource;
pub mod resources;
mod routes;

pub use controller::{GenericMessage, ResourceController};
pub use resource::Resource;
pub use routes::register_resource;
