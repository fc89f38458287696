//! Composite citizen endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CitizenId;
use projections::{CompositePayload, CompositeRecord};
use registry_store::{AddressStore, CitizenStore, CredentialStore};
use saga::CitizenOrchestrator;
use serde::Serialize;

use crate::error::ApiError;

/// The orchestrator as wired by the server, over boxed stores.
pub type Orchestrator = CitizenOrchestrator<
    Arc<dyn CitizenStore>,
    Arc<dyn CredentialStore>,
    Arc<dyn AddressStore>,
>;

/// Which store backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Memory,
    Postgres,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Memory => "memory",
            Storage::Postgres => "postgres",
        }
    }
}

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub storage: Storage,
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenActionResponse {
    pub message: &'static str,
    pub citizen_id: CitizenId,
}

impl CitizenActionResponse {
    fn new(message: &'static str, citizen_id: CitizenId) -> Json<Self> {
        Json(Self {
            message,
            citizen_id,
        })
    }
}

// -- Handlers --

/// POST /registrations: create a citizen with its credential and domicile.
#[tracing::instrument(skip(state, payload))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CompositePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CitizenActionResponse>), ApiError> {
    let Json(payload) = payload.map_err(bad_body)?;
    let citizen_id = state.orchestrator.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        CitizenActionResponse::new("Citizen registered successfully.", citizen_id),
    ))
}

/// GET /citizens/complete: every citizen with its dependents.
#[tracing::instrument(skip(state))]
pub async fn list_complete(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CompositeRecord>>, ApiError> {
    Ok(Json(state.orchestrator.list_complete().await?))
}

/// GET /citizens/national-id/:nationalId: one composite record by business key.
#[tracing::instrument(skip(state))]
pub async fn get_by_national_id(
    State(state): State<Arc<AppState>>,
    Path(national_id): Path<String>,
) -> Result<Json<CompositeRecord>, ApiError> {
    Ok(Json(
        state.orchestrator.get_by_national_id(&national_id).await?,
    ))
}

/// GET /citizens/:id: one composite record by store-assigned id.
#[tracing::instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CompositeRecord>, ApiError> {
    let id: CitizenId = id
        .parse()
        .map_err(|_| ApiError::BadRequest("id must be an integer.".to_string()))?;
    Ok(Json(state.orchestrator.get_by_id(id).await?))
}

/// PUT /citizens/national-id/:nationalId: update a citizen and upsert the
/// dependents present in the body.
#[tracing::instrument(skip(state, payload))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(national_id): Path<String>,
    payload: Result<Json<CompositePayload>, JsonRejection>,
) -> Result<Json<CitizenActionResponse>, ApiError> {
    let Json(payload) = payload.map_err(bad_body)?;
    let citizen_id = state.orchestrator.update(&national_id, payload).await?;

    Ok(CitizenActionResponse::new(
        "Citizen updated successfully.",
        citizen_id,
    ))
}

/// DELETE /citizens/national-id/:nationalId: remove a citizen and its dependents.
#[tracing::instrument(skip(state))]
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(national_id): Path<String>,
) -> Result<Json<CitizenActionResponse>, ApiError> {
    let citizen_id = state.orchestrator.remove(&national_id).await?;

    Ok(CitizenActionResponse::new(
        "Citizen deleted successfully.",
        citizen_id,
    ))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}
