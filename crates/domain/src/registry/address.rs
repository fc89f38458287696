//! Address (domicile) records, one per citizen.

use common::CitizenId;
use serde::{Deserialize, Serialize};

/// A stored address, owned by a citizen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub citizen_id: CitizenId,
    pub street: String,
    pub municipality: Option<String>,
    pub state: Option<String>,
}

/// Validated address fields, not yet attached to an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub street: String,
    pub municipality: Option<String>,
    pub state: Option<String>,
}

impl NewAddress {
    pub fn for_citizen(&self, citizen_id: CitizenId) -> Address {
        Address {
            citizen_id,
            street: self.street.clone(),
            municipality: self.municipality.clone(),
            state: self.state.clone(),
        }
    }
}
