//! Citizen records.

use chrono::NaiveDate;
use common::CitizenId;
use serde::{Deserialize, Serialize};

use super::NationalId;

/// A stored citizen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citizen {
    #[serde(rename = "citizenId")]
    pub id: CitizenId,
    pub national_id: NationalId,
    pub first_name: String,
    pub paternal_surname: String,
    pub birth_date: NaiveDate,
}

/// A validated citizen ready to be created. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCitizen {
    pub national_id: NationalId,
    pub first_name: String,
    pub paternal_surname: String,
    pub birth_date: NaiveDate,
}

impl NewCitizen {
    /// Materializes the stored record once an id has been assigned.
    pub fn into_citizen(self, id: CitizenId) -> Citizen {
        Citizen {
            id,
            national_id: self.national_id,
            first_name: self.first_name,
            paternal_surname: self.paternal_surname,
            birth_date: self.birth_date,
        }
    }

    /// The mutable part of the record, used by updates.
    pub fn changes(&self) -> CitizenChanges {
        CitizenChanges {
            first_name: self.first_name.clone(),
            paternal_surname: self.paternal_surname.clone(),
            birth_date: self.birth_date,
        }
    }
}

/// Fields an update may overwrite. The id and national id never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitizenChanges {
    pub first_name: String,
    pub paternal_surname: String,
    pub birth_date: NaiveDate,
}

impl Citizen {
    pub fn apply(&mut self, changes: &CitizenChanges) {
        self.first_name = changes.first_name.clone();
        self.paternal_surname = changes.paternal_surname.clone();
        self.birth_date = changes.birth_date;
    }
}
