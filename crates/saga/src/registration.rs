//! Registration saga steps.

use serde::{Deserialize, Serialize};

/// A forward step of the registration saga, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    /// Insert the citizen row.
    CreateCitizen,
    /// Read the citizen back by national id to learn its store id.
    ResolveCitizenId,
    /// Insert the credential under the resolved id.
    CreateCredential,
    /// Insert the address under the resolved id.
    CreateAddress,
}

impl RegistrationStep {
    /// All steps in execution order.
    pub const ALL: [RegistrationStep; 4] = [
        RegistrationStep::CreateCitizen,
        RegistrationStep::ResolveCitizenId,
        RegistrationStep::CreateCredential,
        RegistrationStep::CreateAddress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStep::CreateCitizen => "create_citizen",
            RegistrationStep::ResolveCitizenId => "resolve_citizen_id",
            RegistrationStep::CreateCredential => "create_credential",
            RegistrationStep::CreateAddress => "create_address",
        }
    }
}

impl std::fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step names used by the forward-only workflows in events and errors.
pub mod steps {
    pub const LIST_CITIZENS: &str = "list_citizens";
    pub const FETCH_CITIZEN: &str = "fetch_citizen";
    pub const FETCH_CREDENTIAL: &str = "fetch_credential";
    pub const FETCH_ADDRESS: &str = "fetch_address";
    pub const UPDATE_CITIZEN: &str = "update_citizen";
    pub const UPSERT_CREDENTIAL: &str = "upsert_credential";
    pub const UPSERT_ADDRESS: &str = "upsert_address";
    pub const DELETE_CREDENTIAL: &str = "delete_credential";
    pub const DELETE_ADDRESS: &str = "delete_address";
    pub const DELETE_CITIZEN: &str = "delete_citizen";
}
