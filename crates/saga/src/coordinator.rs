//! Orchestrator for composite citizen workflows.

use std::sync::Arc;
use std::time::Instant;

use common::{CitizenId, EntityKind};
use domain::{
    Citizen, NationalId, NewAddress, NewCitizen, NewCredential, ValidationError,
    validate_address, validate_citizen, validate_credential,
};
use futures_util::future::join_all;
use projections::{CompositePayload, CompositeRecord};
use registry_store::{AddressStore, CitizenStore, CredentialStore, StoreError};
use uuid::Uuid;

use crate::error::{CompensationFailure, Result, SagaError};
use crate::events::{SagaEvent, Workflow};
use crate::ledger::{Compensation, StepLedger};
use crate::observer::{SagaObserver, TracingObserver};
use crate::registration::{RegistrationStep, steps};
use crate::state::RegistrationState;

/// Coordinates the citizen, credential and address stores.
///
/// Registration runs as a saga: each committed step is recorded in a
/// [`StepLedger`] and undone in reverse order if a later step fails. The
/// other workflows are forward-only. Every run reports its progress to the
/// configured [`SagaObserver`].
#[derive(Clone)]
pub struct CitizenOrchestrator<C, Cr, A> {
    citizens: C,
    credentials: Cr,
    addresses: A,
    observer: Arc<dyn SagaObserver>,
}

impl<C, Cr, A> CitizenOrchestrator<C, Cr, A>
where
    C: CitizenStore,
    Cr: CredentialStore,
    A: AddressStore,
{
    /// Creates an orchestrator that reports to `tracing`.
    pub fn new(citizens: C, credentials: Cr, addresses: A) -> Self {
        Self {
            citizens,
            credentials,
            addresses,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the observer.
    pub fn with_observer(mut self, observer: Arc<dyn SagaObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Registers a citizen with its credential and address.
    ///
    /// All three payloads are validated before any store is called. On a
    /// store failure the committed steps are compensated and the result is
    /// [`SagaError::Reverted`], or [`SagaError::RollbackFailed`] when a
    /// compensating delete failed as well.
    #[tracing::instrument(skip(self, payload), fields(workflow = "register"))]
    pub async fn register(&self, payload: CompositePayload) -> Result<CitizenId> {
        let run = WorkflowRun::start(
            self.observer.as_ref(),
            Workflow::Register,
            payload.citizen.national_id.clone(),
        );
        let result = self.run_registration(&run, payload).await;
        run.finish(&result, |id| Some(*id));
        result
    }

    /// Returns every citizen with its dependents.
    ///
    /// A dependent that cannot be read is reported as `null` and a
    /// `DependentDegraded` event is emitted; only a failure to list the
    /// citizens themselves fails the call.
    #[tracing::instrument(skip(self), fields(workflow = "list"))]
    pub async fn list_complete(&self) -> Result<Vec<CompositeRecord>> {
        let run = WorkflowRun::start(self.observer.as_ref(), Workflow::List, None);
        let result = self.run_list(&run).await;
        run.finish(&result, |_| None);
        result
    }

    /// Reads a composite record by national id.
    #[tracing::instrument(skip(self), fields(workflow = "read"))]
    pub async fn get_by_national_id(&self, national_id: &str) -> Result<CompositeRecord> {
        let run = WorkflowRun::start(
            self.observer.as_ref(),
            Workflow::Read,
            Some(national_id.to_string()),
        );
        let result = self.run_read_by_key(&run, national_id).await;
        run.finish(&result, |record| Some(record.citizen_id()));
        result
    }

    /// Reads a composite record by store-assigned id.
    #[tracing::instrument(skip(self), fields(workflow = "read"))]
    pub async fn get_by_id(&self, id: CitizenId) -> Result<CompositeRecord> {
        let run = WorkflowRun::start(self.observer.as_ref(), Workflow::Read, Some(id.to_string()));
        let result = async {
            let citizen = self
                .citizens
                .get_by_id(id)
                .await
                .map_err(citizen_failure(Workflow::Read, steps::FETCH_CITIZEN, id))?;
            run.emit(SagaEvent::step_completed(steps::FETCH_CITIZEN, Some(citizen.id)));
            self.attach_dependents(&run, citizen).await
        }
        .await;
        run.finish(&result, |record| Some(record.citizen_id()));
        result
    }

    /// Updates a citizen and upserts whichever dependents the payload carries.
    ///
    /// The national id is taken from `national_id`, trimmed, not from the
    /// payload. Forward-only: a failure part way leaves earlier writes in place.
    #[tracing::instrument(skip(self, payload), fields(workflow = "update"))]
    pub async fn update(&self, national_id: &str, payload: CompositePayload) -> Result<CitizenId> {
        let run = WorkflowRun::start(
            self.observer.as_ref(),
            Workflow::Update,
            Some(national_id.to_string()),
        );
        let result = self
            .run_update(&run, payload.with_national_id(national_id.trim()))
            .await;
        run.finish(&result, |id| Some(*id));
        result
    }

    /// Deletes a citizen's credential, address and citizen record, in that
    /// order. A dependent that is already absent counts as deleted.
    #[tracing::instrument(skip(self), fields(workflow = "delete"))]
    pub async fn remove(&self, national_id: &str) -> Result<CitizenId> {
        let run = WorkflowRun::start(
            self.observer.as_ref(),
            Workflow::Delete,
            Some(national_id.to_string()),
        );
        let result = self.run_delete(&run, national_id).await;
        run.finish(&result, |id| Some(*id));
        result
    }

    async fn run_registration(
        &self,
        run: &WorkflowRun<'_>,
        payload: CompositePayload,
    ) -> Result<CitizenId> {
        let (citizen, credential, domicile) = payload.split();
        let citizen = validate_citizen(&citizen)?;
        let credential = validate_credential(credential.as_ref())?;
        let address = validate_address(domicile.as_ref())?;

        let mut ledger = StepLedger::new();
        match self
            .register_forward(run, &mut ledger, &citizen, &credential, &address)
            .await
        {
            Ok(id) => {
                ledger.complete();
                Ok(id)
            }
            Err((step, source)) => Err(self.compensate(run, &mut ledger, step, source).await),
        }
    }

    async fn register_forward(
        &self,
        run: &WorkflowRun<'_>,
        ledger: &mut StepLedger,
        citizen: &NewCitizen,
        credential: &NewCredential,
        address: &NewAddress,
    ) -> std::result::Result<CitizenId, (RegistrationStep, StoreError)> {
        let step = RegistrationStep::CreateCitizen;
        self.citizens
            .create(citizen)
            .await
            .map_err(|e| (step, e))?;
        run.emit(ledger.commit(
            step,
            Some(Compensation::DeleteCitizen(citizen.national_id.clone())),
        ));

        let step = RegistrationStep::ResolveCitizenId;
        let id = self
            .citizens
            .get_by_national_id(&citizen.national_id)
            .await
            .map_err(|e| (step, e))?
            .id;
        run.emit(ledger.resolve(id));

        let step = RegistrationStep::CreateCredential;
        self.credentials
            .create(id, credential)
            .await
            .map_err(|e| (step, e))?;
        run.emit(ledger.commit(step, Some(Compensation::DeleteCredential(id))));

        let step = RegistrationStep::CreateAddress;
        self.addresses
            .create(id, address)
            .await
            .map_err(|e| (step, e))?;
        run.emit(ledger.commit(step, Some(Compensation::DeleteAddress(id))));

        Ok(id)
    }

    /// Undoes every committed step, most recent first. Each delete is tried
    /// once; a failure is recorded and the remaining deletes still run.
    #[tracing::instrument(skip(self, run, ledger, source))]
    async fn compensate(
        &self,
        run: &WorkflowRun<'_>,
        ledger: &mut StepLedger,
        step: RegistrationStep,
        source: StoreError,
    ) -> SagaError {
        run.emit(SagaEvent::step_failed(step.as_str(), &source));

        let plan = ledger.begin_compensation(step);
        run.emit(SagaEvent::compensation_started(step.as_str(), plan.len()));

        let mut failures = Vec::new();
        for compensation in plan {
            metrics::counter!("registration_compensations_total", "step" => compensation.as_str())
                .increment(1);

            match self.undo(&compensation).await {
                Ok(()) => run.emit(ledger.compensated(&compensation)),
                Err(error) => {
                    run.emit(ledger.compensation_failed(&compensation, &error));
                    failures.push(CompensationFailure {
                        compensation,
                        error,
                    });
                }
            }
        }

        match ledger.finish_compensation() {
            RegistrationState::RollbackFailed => {
                metrics::counter!("registration_rollback_failures_total").increment(1);
                if let Some(event) = ledger.rollback_failed_event() {
                    run.emit(event);
                }
                SagaError::RollbackFailed {
                    step,
                    source,
                    failures,
                }
            }
            _ => SagaError::Reverted { step, source },
        }
    }

    async fn undo(&self, compensation: &Compensation) -> registry_store::Result<()> {
        match compensation {
            Compensation::DeleteAddress(id) => self.addresses.delete_by_citizen(*id).await,
            Compensation::DeleteCredential(id) => self.credentials.delete_by_citizen(*id).await,
            Compensation::DeleteCitizen(national_id) => {
                self.citizens.delete_by_national_id(national_id).await
            }
        }
    }

    async fn run_list(&self, run: &WorkflowRun<'_>) -> Result<Vec<CompositeRecord>> {
        let citizens = self
            .citizens
            .list()
            .await
            .map_err(|e| SagaError::store(Workflow::List, steps::LIST_CITIZENS, e))?;
        run.emit(SagaEvent::step_completed(steps::LIST_CITIZENS, None));

        Ok(join_all(
            citizens
                .into_iter()
                .map(|citizen| self.attach_dependents_tolerant(run, citizen)),
        )
        .await)
    }

    async fn run_read_by_key(
        &self,
        run: &WorkflowRun<'_>,
        national_id: &str,
    ) -> Result<CompositeRecord> {
        let key = lookup_key(national_id)?;
        let citizen = self
            .citizens
            .get_by_national_id(&key)
            .await
            .map_err(citizen_failure(Workflow::Read, steps::FETCH_CITIZEN, national_id))?;
        run.emit(SagaEvent::step_completed(steps::FETCH_CITIZEN, Some(citizen.id)));

        self.attach_dependents(run, citizen).await
    }

    /// Fetches both dependents concurrently. Absence reads as `None`; any
    /// other store failure fails the read.
    async fn attach_dependents(
        &self,
        run: &WorkflowRun<'_>,
        citizen: Citizen,
    ) -> Result<CompositeRecord> {
        let id = citizen.id;
        let (credential, address) = tokio::join!(
            self.credentials.get_by_citizen(id),
            self.addresses.get_by_citizen(id)
        );

        let credential = absent_as_none(credential)
            .map_err(|e| SagaError::store(run.workflow, steps::FETCH_CREDENTIAL, e))?;
        let address = absent_as_none(address)
            .map_err(|e| SagaError::store(run.workflow, steps::FETCH_ADDRESS, e))?;

        Ok(CompositeRecord::assemble(citizen, credential, address)?)
    }

    /// Like [`Self::attach_dependents`], but a failing dependent is reported
    /// and replaced by `None`. Dependents that cannot be attached leave a
    /// citizen-only record.
    async fn attach_dependents_tolerant(
        &self,
        run: &WorkflowRun<'_>,
        citizen: Citizen,
    ) -> CompositeRecord {
        let id = citizen.id;
        let (credential, address) = tokio::join!(
            self.credentials.get_by_citizen(id),
            self.addresses.get_by_citizen(id)
        );

        let credential = run.degrade(id, EntityKind::Credential, absent_as_none(credential));
        let address = run.degrade(id, EntityKind::Address, absent_as_none(address));

        match CompositeRecord::assemble(citizen.clone(), credential, address) {
            Ok(record) => record,
            Err(error) => {
                run.emit(SagaEvent::dependent_degraded(id, error.entity(), &error));
                CompositeRecord::citizen_only(citizen)
            }
        }
    }

    async fn run_update(
        &self,
        run: &WorkflowRun<'_>,
        payload: CompositePayload,
    ) -> Result<CitizenId> {
        let (citizen, credential, domicile) = payload.split();
        let citizen = validate_citizen(&citizen)?;
        let credential = credential
            .as_ref()
            .map(|c| validate_credential(Some(c)))
            .transpose()?;
        let address = domicile
            .as_ref()
            .map(|a| validate_address(Some(a)))
            .transpose()?;

        let national_id = &citizen.national_id;
        let id = self
            .citizens
            .get_by_national_id(national_id)
            .await
            .map_err(citizen_failure(Workflow::Update, steps::FETCH_CITIZEN, national_id))?
            .id;
        run.emit(SagaEvent::step_completed(steps::FETCH_CITIZEN, Some(id)));

        self.citizens
            .update(national_id, &citizen.changes())
            .await
            .map_err(citizen_failure(Workflow::Update, steps::UPDATE_CITIZEN, national_id))?;
        run.emit(SagaEvent::step_completed(steps::UPDATE_CITIZEN, Some(id)));

        if let Some(credential) = credential {
            self.upsert_credential(id, &credential)
                .await
                .map_err(|e| SagaError::store(Workflow::Update, steps::UPSERT_CREDENTIAL, e))?;
            run.emit(SagaEvent::step_completed(steps::UPSERT_CREDENTIAL, Some(id)));
        }

        if let Some(address) = address {
            self.upsert_address(id, &address)
                .await
                .map_err(|e| SagaError::store(Workflow::Update, steps::UPSERT_ADDRESS, e))?;
            run.emit(SagaEvent::step_completed(steps::UPSERT_ADDRESS, Some(id)));
        }

        Ok(id)
    }

    async fn upsert_credential(
        &self,
        id: CitizenId,
        credential: &NewCredential,
    ) -> registry_store::Result<()> {
        match self.credentials.get_by_citizen(id).await {
            Ok(_) => self.credentials.update(id, credential).await,
            Err(e) if e.is_not_found() => self.credentials.create(id, credential).await,
            Err(e) => Err(e),
        }
    }

    async fn upsert_address(&self, id: CitizenId, address: &NewAddress) -> registry_store::Result<()> {
        match self.addresses.get_by_citizen(id).await {
            Ok(_) => self.addresses.update(id, address).await,
            Err(e) if e.is_not_found() => self.addresses.create(id, address).await,
            Err(e) => Err(e),
        }
    }

    async fn run_delete(&self, run: &WorkflowRun<'_>, national_id: &str) -> Result<CitizenId> {
        let key = lookup_key(national_id)?;
        let id = self
            .citizens
            .get_by_national_id(&key)
            .await
            .map_err(citizen_failure(Workflow::Delete, steps::FETCH_CITIZEN, national_id))?
            .id;
        run.emit(SagaEvent::step_completed(steps::FETCH_CITIZEN, Some(id)));

        absent_as_deleted(self.credentials.delete_by_citizen(id).await)
            .map_err(|e| SagaError::store(Workflow::Delete, steps::DELETE_CREDENTIAL, e))?;
        run.emit(SagaEvent::step_completed(steps::DELETE_CREDENTIAL, Some(id)));

        absent_as_deleted(self.addresses.delete_by_citizen(id).await)
            .map_err(|e| SagaError::store(Workflow::Delete, steps::DELETE_ADDRESS, e))?;
        run.emit(SagaEvent::step_completed(steps::DELETE_ADDRESS, Some(id)));

        self.citizens
            .delete_by_national_id(&key)
            .await
            .map_err(citizen_failure(Workflow::Delete, steps::DELETE_CITIZEN, national_id))?;
        run.emit(SagaEvent::step_completed(steps::DELETE_CITIZEN, Some(id)));

        Ok(id)
    }
}

/// Per-invocation bookkeeping: run id, observer delivery and metrics.
struct WorkflowRun<'a> {
    id: Uuid,
    workflow: Workflow,
    observer: &'a dyn SagaObserver,
    started: Instant,
}

impl<'a> WorkflowRun<'a> {
    fn start(observer: &'a dyn SagaObserver, workflow: Workflow, key: Option<String>) -> Self {
        metrics::counter!("registry_workflows_total", "workflow" => workflow.as_str())
            .increment(1);

        let run = Self {
            id: Uuid::new_v4(),
            workflow,
            observer,
            started: Instant::now(),
        };
        run.emit(SagaEvent::workflow_started(workflow, key));
        run
    }

    fn emit(&self, event: SagaEvent) {
        self.observer.on_event(self.id, &event);
    }

    /// Turns a failed dependent read into `None`, reporting it.
    fn degrade<T>(
        &self,
        citizen_id: CitizenId,
        entity: EntityKind,
        result: registry_store::Result<Option<T>>,
    ) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(error) => {
                self.emit(SagaEvent::dependent_degraded(citizen_id, entity, error));
                None
            }
        }
    }

    fn finish<T>(self, result: &Result<T>, citizen_id: impl FnOnce(&T) -> Option<CitizenId>) {
        let workflow = self.workflow.as_str();
        metrics::histogram!("registry_workflow_duration_seconds", "workflow" => workflow)
            .record(self.started.elapsed().as_secs_f64());

        match result {
            Ok(value) => {
                self.emit(SagaEvent::workflow_completed(self.workflow, citizen_id(value)));
            }
            Err(error) => {
                metrics::counter!(
                    "registry_workflow_failures_total",
                    "workflow" => workflow,
                    "kind" => error_kind(error)
                )
                .increment(1);
                self.emit(SagaEvent::workflow_failed(
                    self.workflow,
                    error.to_string(),
                    error.is_fatal(),
                ));
            }
        }
    }
}

fn error_kind(error: &SagaError) -> &'static str {
    match error {
        SagaError::Validation(_) => "validation",
        SagaError::CitizenNotFound(_) => "not_found",
        SagaError::Store { .. } => "store",
        SagaError::Reverted { .. } => "reverted",
        SagaError::RollbackFailed { .. } => "rollback_failed",
        SagaError::Projection(_) => "projection",
    }
}

/// Parses a lookup key from a path. A blank key is a client error; a key of
/// the wrong length cannot match any citizen.
fn lookup_key(raw: &str) -> Result<NationalId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("nationalId", "nationalId is required.").into());
    }
    NationalId::parse(trimmed).map_err(|_| SagaError::CitizenNotFound(raw.to_string()))
}

/// Maps a citizen store failure, turning absence into `CitizenNotFound`.
fn citizen_failure(
    workflow: Workflow,
    step: &'static str,
    key: impl ToString,
) -> impl FnOnce(StoreError) -> SagaError {
    move |error| {
        if error.is_not_found() {
            SagaError::CitizenNotFound(key.to_string())
        } else {
            SagaError::store(workflow, step, error)
        }
    }
}

fn absent_as_none<T>(result: registry_store::Result<T>) -> registry_store::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn absent_as_deleted(result: registry_store::Result<()>) -> registry_store::Result<()> {
    absent_as_none(result).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use domain::{AddressInput, CitizenInput, Credential, CredentialInput};
    use registry_store::{
        InMemoryAddressStore, InMemoryCitizenStore, InMemoryCredentialStore, Operation,
    };

    const KEY: &str = "RUAA900101MDFZNN09";

    type Orchestrator =
        CitizenOrchestrator<InMemoryCitizenStore, InMemoryCredentialStore, InMemoryAddressStore>;

    struct Fixture {
        orchestrator: Orchestrator,
        citizens: InMemoryCitizenStore,
        credentials: InMemoryCredentialStore,
        addresses: InMemoryAddressStore,
        observer: RecordingObserver,
    }

    fn fixture() -> Fixture {
        let citizens = InMemoryCitizenStore::new();
        let credentials = InMemoryCredentialStore::new();
        let addresses = InMemoryAddressStore::new();
        let observer = RecordingObserver::new();
        let orchestrator =
            CitizenOrchestrator::new(citizens.clone(), credentials.clone(), addresses.clone())
                .with_observer(Arc::new(observer.clone()));

        Fixture {
            orchestrator,
            citizens,
            credentials,
            addresses,
            observer,
        }
    }

    fn payload(key: &str, folio: &str) -> CompositePayload {
        CompositePayload {
            citizen: CitizenInput {
                national_id: Some(key.to_string()),
                first_name: Some("Ana".to_string()),
                paternal_surname: Some("Ruiz".to_string()),
                birth_date: Some("1990-01-01".to_string()),
            },
            credential: Some(CredentialInput {
                folio: Some(folio.to_string()),
                kind: Some("NEW".to_string()),
                issue_date: Some("2024-01-01".to_string()),
            }),
            domicile: Some(AddressInput {
                street: Some("Av. Reforma 1".to_string()),
                municipality: Some("CDMX".to_string()),
                state: Some("CDMX".to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn test_register_emits_steps_in_order() {
        let f = fixture();

        let id = f.orchestrator.register(payload(KEY, "F-001")).await.unwrap();

        assert_eq!(id, CitizenId::new(1));
        assert_eq!(
            f.observer.event_types(),
            vec![
                "WorkflowStarted",
                "StepCompleted",
                "StepCompleted",
                "StepCompleted",
                "StepCompleted",
                "WorkflowCompleted",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_resolve_deletes_citizen_only() {
        let f = fixture();
        f.citizens.set_fail_on(Operation::Read, true);

        let err = f
            .orchestrator
            .register(payload(KEY, "F-001"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SagaError::Reverted {
                step: RegistrationStep::ResolveCitizenId,
                ..
            }
        ));
        assert!(f.citizens.is_empty().await);
        assert!(f.credentials.is_empty().await);

        let compensations: Vec<_> = f
            .observer
            .events()
            .into_iter()
            .filter_map(|(_, event)| match event {
                SagaEvent::CompensationStepCompleted(data) => Some(data.step),
                _ => None,
            })
            .collect();
        assert_eq!(compensations, vec!["delete_citizen".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_key_is_reverted_without_touching_existing_record() {
        let f = fixture();
        f.orchestrator.register(payload(KEY, "F-001")).await.unwrap();

        let err = f
            .orchestrator
            .register(payload(KEY, "F-002"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SagaError::Reverted {
                step: RegistrationStep::CreateCitizen,
                source: StoreError::Duplicate { .. },
            }
        ));
        assert!(f.citizens.contains(KEY).await);
        assert!(f.credentials.contains(CitizenId::new(1)).await);
    }

    #[test]
    fn test_lookup_key_rules() {
        assert!(matches!(lookup_key("  "), Err(SagaError::Validation(_))));
        assert!(matches!(
            lookup_key("SHORT"),
            Err(SagaError::CitizenNotFound(key)) if key == "SHORT"
        ));
        assert_eq!(lookup_key(KEY).unwrap().as_str(), KEY);
    }

    #[tokio::test]
    async fn test_wrong_length_key_never_reaches_the_store() {
        let f = fixture();
        f.citizens.set_fail_on(Operation::Read, true);

        let err = f.orchestrator.get_by_national_id("SHORT").await.unwrap_err();
        assert!(matches!(err, SagaError::CitizenNotFound(_)));

        let err = f.orchestrator.remove("SHORT").await.unwrap_err();
        assert!(matches!(err, SagaError::CitizenNotFound(_)));
    }

    #[tokio::test]
    async fn test_single_read_propagates_dependent_store_failure() {
        let f = fixture();
        f.orchestrator.register(payload(KEY, "F-001")).await.unwrap();
        f.addresses.set_fail_on(Operation::Read, true);

        let err = f.orchestrator.get_by_national_id(KEY).await.unwrap_err();

        assert!(matches!(
            err,
            SagaError::Store {
                workflow: Workflow::Read,
                step: steps::FETCH_ADDRESS,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_list_degrades_failing_dependent_to_null() {
        let f = fixture();
        f.orchestrator.register(payload(KEY, "F-001")).await.unwrap();
        f.credentials.set_fail_on(Operation::Read, true);
        f.observer.clear();

        let records = f.orchestrator.list_complete().await.unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].credential().is_none());
        assert!(records[0].domicile().is_some());
        assert!(f.observer.event_types().contains(&"DependentDegraded"));
    }

    /// Serves every credential as if it belonged to citizen 99.
    struct MisownedCredentials(InMemoryCredentialStore);

    #[async_trait::async_trait]
    impl CredentialStore for MisownedCredentials {
        async fn create(
            &self,
            citizen_id: CitizenId,
            credential: &NewCredential,
        ) -> registry_store::Result<()> {
            self.0.create(citizen_id, credential).await
        }

        async fn list(&self) -> registry_store::Result<Vec<Credential>> {
            self.0.list().await
        }

        async fn get_by_citizen(&self, citizen_id: CitizenId) -> registry_store::Result<Credential> {
            let mut credential = self.0.get_by_citizen(citizen_id).await?;
            credential.citizen_id = CitizenId::new(99);
            Ok(credential)
        }

        async fn update(
            &self,
            citizen_id: CitizenId,
            credential: &NewCredential,
        ) -> registry_store::Result<()> {
            self.0.update(citizen_id, credential).await
        }

        async fn delete_by_citizen(&self, citizen_id: CitizenId) -> registry_store::Result<()> {
            self.0.delete_by_citizen(citizen_id).await
        }
    }

    #[tokio::test]
    async fn test_list_keeps_citizen_whose_dependents_cannot_be_attached() {
        let observer = RecordingObserver::new();
        let orchestrator = CitizenOrchestrator::new(
            InMemoryCitizenStore::new(),
            MisownedCredentials(InMemoryCredentialStore::new()),
            InMemoryAddressStore::new(),
        )
        .with_observer(Arc::new(observer.clone()));
        orchestrator.register(payload(KEY, "F-001")).await.unwrap();
        observer.clear();

        let records = orchestrator.list_complete().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].citizen().national_id.as_str(), KEY);
        assert!(records[0].credential().is_none());
        assert!(records[0].domicile().is_none());
        assert!(observer.events().iter().any(|(_, event)| matches!(
            event,
            SagaEvent::DependentDegraded(data) if data.entity == EntityKind::Credential
        )));

        let err = orchestrator.get_by_national_id(KEY).await.unwrap_err();
        assert!(matches!(err, SagaError::Projection(_)));
    }

    #[tokio::test]
    async fn test_failures_are_reported_to_observer() {
        let f = fixture();

        let err = f.orchestrator.remove(KEY).await.unwrap_err();
        assert!(matches!(err, SagaError::CitizenNotFound(_)));

        let events = f.observer.events();
        match &events.last().unwrap().1 {
            SagaEvent::WorkflowFailed(data) => {
                assert_eq!(data.workflow, Workflow::Delete);
                assert!(!data.fatal);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_one_run_id_per_invocation() {
        let f = fixture();
        f.orchestrator.register(payload(KEY, "F-001")).await.unwrap();
        f.orchestrator.get_by_id(CitizenId::new(1)).await.unwrap();

        let mut run_ids: Vec<_> = f.observer.events().into_iter().map(|(id, _)| id).collect();
        run_ids.dedup();
        assert_eq!(run_ids.len(), 2);
    }
}
