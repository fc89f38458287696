//! Domain layer for the citizen registry.
//!
//! This crate provides:
//! - Entity records for citizens and their dependent credential and address
//! - Value objects (national id, credential kind, calendar dates)
//! - The validation gate that turns raw request payloads into typed inputs

pub mod error;
pub mod registry;
pub mod validation;

pub use error::ValidationError;
pub use registry::{
    Address, Citizen, CitizenChanges, Credential, CredentialKind, NationalId, NewAddress,
    NewCitizen, NewCredential, parse_date,
};
pub use validation::{
    AddressInput, CitizenInput, CredentialInput, validate_address, validate_citizen,
    validate_credential,
};
