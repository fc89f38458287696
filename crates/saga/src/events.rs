//! Structured saga events delivered to a [`SagaObserver`](crate::SagaObserver).

use chrono::{DateTime, Utc};
use common::{CitizenId, EntityKind};
use serde::{Deserialize, Serialize};

/// The workflows the orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    Register,
    List,
    Read,
    Update,
    Delete,
}

impl Workflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Workflow::Register => "register",
            Workflow::List => "list",
            Workflow::Read => "read",
            Workflow::Update => "update",
            Workflow::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that can occur while a workflow runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SagaEvent {
    /// A workflow run started.
    WorkflowStarted(WorkflowStartedData),

    /// A step completed successfully.
    StepCompleted(StepCompletedData),

    /// A step failed.
    StepFailed(StepFailedData),

    /// Compensation started after a registration step failed.
    CompensationStarted(CompensationData),

    /// A compensating delete completed.
    CompensationStepCompleted(StepData),

    /// A compensating delete failed (compensation continues).
    CompensationStepFailed(StepFailedData),

    /// A dependent could not be read and was reported as absent.
    DependentDegraded(DependentDegradedData),

    /// At least one compensation failed; the stores are inconsistent.
    RollbackFailed(RollbackFailedData),

    /// The workflow finished successfully.
    WorkflowCompleted(WorkflowCompletedData),

    /// The workflow finished with an error.
    WorkflowFailed(WorkflowFailedData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStartedData {
    pub workflow: Workflow,
    /// The business key or id the workflow was invoked with, if any.
    pub key: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    pub step: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCompletedData {
    pub step: String,
    /// Set once the citizen id is known.
    pub citizen_id: Option<CitizenId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepFailedData {
    pub step: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationData {
    /// The step whose failure triggered compensation.
    pub from_step: String,
    /// Number of committed steps to undo.
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentDegradedData {
    pub citizen_id: CitizenId,
    pub entity: EntityKind,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackFailedData {
    pub from_step: String,
    /// Compensation steps that failed, in the order they were attempted.
    pub failed_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCompletedData {
    pub workflow: Workflow,
    pub citizen_id: Option<CitizenId>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowFailedData {
    pub workflow: Workflow,
    pub reason: String,
    /// True when the failure left the stores inconsistent.
    pub fatal: bool,
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors
impl SagaEvent {
    pub fn workflow_started(workflow: Workflow, key: Option<String>) -> Self {
        SagaEvent::WorkflowStarted(WorkflowStartedData {
            workflow,
            key,
            started_at: Utc::now(),
        })
    }

    pub fn step_completed(step: impl Into<String>, citizen_id: Option<CitizenId>) -> Self {
        SagaEvent::StepCompleted(StepCompletedData {
            step: step.into(),
            citizen_id,
        })
    }

    pub fn step_failed(step: impl Into<String>, error: impl ToString) -> Self {
        SagaEvent::StepFailed(StepFailedData {
            step: step.into(),
            error: error.to_string(),
        })
    }

    pub fn compensation_started(from_step: impl Into<String>, pending: usize) -> Self {
        SagaEvent::CompensationStarted(CompensationData {
            from_step: from_step.into(),
            pending,
        })
    }

    pub fn compensation_step_completed(step: impl Into<String>) -> Self {
        SagaEvent::CompensationStepCompleted(StepData { step: step.into() })
    }

    pub fn compensation_step_failed(step: impl Into<String>, error: impl ToString) -> Self {
        SagaEvent::CompensationStepFailed(StepFailedData {
            step: step.into(),
            error: error.to_string(),
        })
    }

    pub fn dependent_degraded(
        citizen_id: CitizenId,
        entity: EntityKind,
        error: impl ToString,
    ) -> Self {
        SagaEvent::DependentDegraded(DependentDegradedData {
            citizen_id,
            entity,
            error: error.to_string(),
        })
    }

    pub fn rollback_failed(from_step: impl Into<String>, failed_steps: Vec<String>) -> Self {
        SagaEvent::RollbackFailed(RollbackFailedData {
            from_step: from_step.into(),
            failed_steps,
        })
    }

    pub fn workflow_completed(workflow: Workflow, citizen_id: Option<CitizenId>) -> Self {
        SagaEvent::WorkflowCompleted(WorkflowCompletedData {
            workflow,
            citizen_id,
            completed_at: Utc::now(),
        })
    }

    pub fn workflow_failed(workflow: Workflow, reason: impl Into<String>, fatal: bool) -> Self {
        SagaEvent::WorkflowFailed(WorkflowFailedData {
            workflow,
            reason: reason.into(),
            fatal,
            failed_at: Utc::now(),
        })
    }

    /// The event name, as used in logs and by the recording observer.
    pub fn event_type(&self) -> &'static str {
        match self {
            SagaEvent::WorkflowStarted(_) => "WorkflowStarted",
            SagaEvent::StepCompleted(_) => "StepCompleted",
            SagaEvent::StepFailed(_) => "StepFailed",
            SagaEvent::CompensationStarted(_) => "CompensationStarted",
            SagaEvent::CompensationStepCompleted(_) => "CompensationStepCompleted",
            SagaEvent::CompensationStepFailed(_) => "CompensationStepFailed",
            SagaEvent::DependentDegraded(_) => "DependentDegraded",
            SagaEvent::RollbackFailed(_) => "RollbackFailed",
            SagaEvent::WorkflowCompleted(_) => "WorkflowCompleted",
            SagaEvent::WorkflowFailed(_) => "WorkflowFailed",
        }
    }
}
