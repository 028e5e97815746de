//! The park resource.

use almanac_store::Entity;
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// A park record.
///
/// The rating is carried as a string, matching how callers submit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Park {
    /// Store-assigned identifier; `None` until first saved.
    pub id: Option<i64>,
    /// Name of the park.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Rating, e.g. "4.0".
    pub rating: String,
}

/// The caller-writable fields of a [`Park`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkPayload {
    /// Name of the park.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Rating, e.g. "4.0".
    pub rating: String,
}

impl Entity for Park {
    const KIND: &'static str = "Park";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Resource for Park {
    const BASE_PATH: &'static str = "/api/park";
    const OPERATION_STEM: &'static str = "Park";

    type Payload = ParkPayload;

    fn from_payload(payload: ParkPayload) -> Self {
        Self {
            id: None,
            name: payload.name,
            address: payload.address,
            rating: payload.rating,
        }
    }

    fn apply(&mut self, payload: ParkPayload) {
        self.name = payload.name;
        self.address = payload.address;
        self.rating = payload.rating;
    }
}
