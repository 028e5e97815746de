//! The resource kinds served by Almanac.

mod book;
mod park;
mod restaurant;

pub use book::{Book, BookPayload};
pub use park::{Park, ParkPayload};
pub use restaurant::{Restaurant, RestaurantPayload};
