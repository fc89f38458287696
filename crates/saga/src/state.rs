//! Registration saga state machine.

use serde::{Deserialize, Serialize};

use crate::registration::RegistrationStep;

/// The state of a registration saga in its lifecycle.
///
/// State transitions:
/// ```text
/// Start ──► CitizenCreated ──► IdResolved ──► CredentialCreated ──► AddressCreated ──► Done
///   │             │                │                 │                    │
///   └─────────────┴────────────────┴──────┬──────────┴────────────────────┘
///                                         ▼
///                                   Compensating ──┬──► Reverted
///                                                  └──► RollbackFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RegistrationState {
    /// No step has run yet.
    #[default]
    Start,

    /// The citizen row exists.
    CitizenCreated,

    /// The citizen's store id is known.
    IdResolved,

    /// The credential row exists.
    CredentialCreated,

    /// The address row exists.
    AddressCreated,

    /// All steps completed successfully (terminal state).
    Done,

    /// A step failed and compensating deletes are in progress.
    Compensating,

    /// Every committed step was undone (terminal state).
    Reverted,

    /// At least one compensating delete failed; the stores are left
    /// inconsistent (terminal state).
    RollbackFailed,
}

impl RegistrationState {
    /// The state reached once the given step has committed.
    pub fn after(step: RegistrationStep) -> Self {
        match step {
            RegistrationStep::CreateCitizen => RegistrationState::CitizenCreated,
            RegistrationStep::ResolveCitizenId => RegistrationState::IdResolved,
            RegistrationStep::CreateCredential => RegistrationState::CredentialCreated,
            RegistrationStep::CreateAddress => RegistrationState::AddressCreated,
        }
    }

    /// Returns true while forward steps may still run.
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            RegistrationState::Start
                | RegistrationState::CitizenCreated
                | RegistrationState::IdResolved
                | RegistrationState::CredentialCreated
                | RegistrationState::AddressCreated
        )
    }

    /// Returns true if the saga can begin compensation.
    pub fn can_compensate(&self) -> bool {
        self.is_running()
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationState::Done
                | RegistrationState::Reverted
                | RegistrationState::RollbackFailed
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationState::Start => "START",
            RegistrationState::CitizenCreated => "CITIZEN_CREATED",
            RegistrationState::IdResolved => "ID_RESOLVED",
            RegistrationState::CredentialCreated => "CREDENTIAL_CREATED",
            RegistrationState::AddressCreated => "ADDRESS_CREATED",
            RegistrationState::Done => "DONE",
            RegistrationState::Compensating => "COMPENSATING",
            RegistrationState::Reverted => "REVERTED",
            RegistrationState::RollbackFailed => "ROLLBACK_FAILED",
        }
    }
}

impl std::fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
