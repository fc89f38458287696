//! Registry entities: a citizen and its one-to-one dependents.

mod address;
mod citizen;
mod credential;
mod value_objects;

pub use address::{Address, NewAddress};
pub use citizen::{Citizen, CitizenChanges, NewCitizen};
pub use credential::{Credential, NewCredential};
pub use value_objects::{CredentialKind, NationalId, parse_date};
