//! Saga orchestration for citizen registration.
//!
//! Citizens, credentials and addresses live in three independent stores, so
//! no single transaction can span a registration. This crate coordinates
//! them:
//! 1. Create the citizen
//! 2. Resolve its id by national id
//! 3. Create the credential
//! 4. Create the address
//!
//! If any step fails, previously committed steps are compensated in reverse
//! order. Reads, updates and deletes run forward-only through the same
//! [`CitizenOrchestrator`], and every workflow reports structured
//! [`SagaEvent`]s to an injected [`SagaObserver`].

pub mod coordinator;
pub mod error;
pub mod events;
pub mod ledger;
pub mod observer;
pub mod registration;
pub mod state;

pub use coordinator::CitizenOrchestrator;
pub use error::{CompensationFailure, Result, SagaError};
pub use events::{SagaEvent, Workflow};
pub use ledger::{Compensation, StepLedger};
pub use observer::{NoOpObserver, RecordingObserver, SagaObserver, TracingObserver};
pub use registration::RegistrationStep;
pub use state::RegistrationState;
