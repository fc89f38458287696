//! Observers receive every saga event as it happens.

use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::events::SagaEvent;

/// Receives structured events from workflow runs.
///
/// `run_id` groups the events of one workflow invocation.
pub trait SagaObserver: Send + Sync {
    fn on_event(&self, run_id: Uuid, event: &SagaEvent);
}

/// Forwards events to `tracing`. Failures are logged at warn level and a
/// failed rollback at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SagaObserver for TracingObserver {
    fn on_event(&self, run_id: Uuid, event: &SagaEvent) {
        let event_type = event.event_type();
        match event {
            SagaEvent::RollbackFailed(data) => tracing::error!(
                %run_id,
                event_type,
                from_step = %data.from_step,
                failed_steps = ?data.failed_steps,
                "Rollback failed, stores left inconsistent"
            ),
            SagaEvent::StepFailed(data) | SagaEvent::CompensationStepFailed(data) => {
                tracing::warn!(%run_id, event_type, step = %data.step, error = %data.error)
            }
            SagaEvent::DependentDegraded(data) => tracing::warn!(
                %run_id,
                event_type,
                citizen_id = %data.citizen_id,
                entity = %data.entity,
                error = %data.error,
                "Dependent reported as absent"
            ),
            SagaEvent::WorkflowFailed(data) => tracing::warn!(
                %run_id,
                event_type,
                workflow = %data.workflow,
                fatal = data.fatal,
                reason = %data.reason
            ),
            _ => tracing::debug!(%run_id, event_type, ?event),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl SagaObserver for NoOpObserver {
    fn on_event(&self, _run_id: Uuid, _event: &SagaEvent) {}
}

/// Keeps every event in memory, for tests and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<(Uuid, SagaEvent)>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Uuid, SagaEvent)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event names in arrival order.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, event)| event.event_type())
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl SagaObserver for RecordingObserver {
    fn on_event(&self, run_id: Uuid, event: &SagaEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((run_id, event.clone()));
    }
}
