//! The restaurant resource.

use almanac_store::Entity;
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// A restaurant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Store-assigned identifier; `None` until first saved.
    pub id: Option<i64>,
    /// Name of the restaurant.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Free-form description.
    pub description: String,
}

/// The caller-writable fields of a [`Restaurant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantPayload {
    /// Name of the restaurant.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Free-form description.
    pub description: String,
}

impl Entity for Restaurant {
    const KIND: &'static str = "Restaurant";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Resource for Restaurant {
    const BASE_PATH: &'static str = "/api/restaurant";
    const OPERATION_STEM: &'static str = "Restaurant";

    type Payload = RestaurantPayload;

    fn from_payload(payload: RestaurantPayload) -> Self {
        Self {
            id: None,
            name: payload.name,
            address: payload.address,
            city: payload.city,
            state: payload.state,
            zip: payload.zip,
            description: payload.description,
        }
    }

    fn apply(&mut self, payload: RestaurantPayload) {
        self.name = payload.name;
        self.address = payload.address;
        self.city = payload.city;
        self.state = payload.state;
        self.zip = payload.zip;
        self.description = payload.description;
    }
}
