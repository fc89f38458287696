//! Step ledger for a single registration run.

use common::CitizenId;
use domain::NationalId;

use crate::events::SagaEvent;
use crate::registration::RegistrationStep;
use crate::state::RegistrationState;

/// A compensating delete for a committed registration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    DeleteAddress(CitizenId),
    DeleteCredential(CitizenId),
    DeleteCitizen(NationalId),
}

impl Compensation {
    /// The forward step this compensation undoes.
    pub fn undoes(&self) -> RegistrationStep {
        match self {
            Compensation::DeleteAddress(_) => RegistrationStep::CreateAddress,
            Compensation::DeleteCredential(_) => RegistrationStep::CreateCredential,
            Compensation::DeleteCitizen(_) => RegistrationStep::CreateCitizen,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compensation::DeleteAddress(_) => "delete_address",
            Compensation::DeleteCredential(_) => "delete_credential",
            Compensation::DeleteCitizen(_) => "delete_citizen",
        }
    }
}

impl std::fmt::Display for Compensation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records which registration steps committed and what undoes them.
///
/// Every transition returns the event describing it, so the caller can hand
/// it straight to the observer.
#[derive(Debug, Clone, Default)]
pub struct StepLedger {
    state: RegistrationState,
    committed: Vec<RegistrationStep>,
    undo: Vec<Compensation>,
    citizen_id: Option<CitizenId>,
    failed_step: Option<RegistrationStep>,
    failed_compensations: Vec<Compensation>,
}

impl StepLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits a forward step together with the delete that reverses it.
    pub fn commit(&mut self, step: RegistrationStep, undo: Option<Compensation>) -> SagaEvent {
        self.state = RegistrationState::after(step);
        self.committed.push(step);
        if let Some(undo) = undo {
            self.undo.push(undo);
        }
        SagaEvent::step_completed(step.as_str(), self.citizen_id)
    }

    /// Commits the id lookup. It writes nothing, so nothing undoes it.
    pub fn resolve(&mut self, citizen_id: CitizenId) -> SagaEvent {
        self.citizen_id = Some(citizen_id);
        self.commit(RegistrationStep::ResolveCitizenId, None)
    }

    /// Marks the run as done once every step committed.
    pub fn complete(&mut self) {
        if self.state == RegistrationState::AddressCreated {
            self.state = RegistrationState::Done;
        }
    }

    /// Switches to compensation and returns the deletes to run, most recent
    /// commit first. Returns nothing when the ledger is already compensating
    /// or finished.
    pub fn begin_compensation(&mut self, failed: RegistrationStep) -> Vec<Compensation> {
        if !self.state.can_compensate() {
            return Vec::new();
        }
        self.state = RegistrationState::Compensating;
        self.failed_step = Some(failed);
        self.undo.iter().rev().cloned().collect()
    }

    pub fn compensated(&self, compensation: &Compensation) -> SagaEvent {
        SagaEvent::compensation_step_completed(compensation.as_str())
    }

    pub fn compensation_failed(
        &mut self,
        compensation: &Compensation,
        error: impl ToString,
    ) -> SagaEvent {
        self.failed_compensations.push(compensation.clone());
        SagaEvent::compensation_step_failed(compensation.as_str(), error)
    }

    /// Settles a compensating run: `RollbackFailed` if any delete failed,
    /// `Reverted` otherwise.
    pub fn finish_compensation(&mut self) -> RegistrationState {
        if self.state == RegistrationState::Compensating {
            self.state = if self.failed_compensations.is_empty() {
                RegistrationState::Reverted
            } else {
                RegistrationState::RollbackFailed
            };
        }
        self.state
    }

    /// The event reporting a failed rollback, if the run ended in one.
    pub fn rollback_failed_event(&self) -> Option<SagaEvent> {
        if self.state != RegistrationState::RollbackFailed {
            return None;
        }
        let from_step = self.failed_step.map(|s| s.as_str()).unwrap_or_default();
        let failed_steps = self
            .failed_compensations
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        Some(SagaEvent::rollback_failed(from_step, failed_steps))
    }

    pub fn state(&self) -> RegistrationState {
        self.state
    }

    pub fn committed_steps(&self) -> &[RegistrationStep] {
        &self.committed
    }

    pub fn citizen_id(&self) -> Option<CitizenId> {
        self.citizen_id
    }

    pub fn failed_step(&self) -> Option<RegistrationStep> {
        self.failed_step
    }

    pub fn failed_compensations(&self) -> &[Compensation] {
        &self.failed_compensations
    }
}
