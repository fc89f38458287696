//! HTTP API server for the citizen registry.
//!
//! Exposes the composite citizen workflows over REST, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use registry_store::{
    AddressStore, CitizenStore, CredentialStore, InMemoryAddressStore, InMemoryCitizenStore,
    InMemoryCredentialStore, PostgresAddressStore, PostgresCitizenStore, PostgresCredentialStore,
};
use saga::CitizenOrchestrator;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::citizens::{AppState, Storage};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/registrations", post(routes::citizens::register))
        .route("/citizens/complete", get(routes::citizens::list_complete))
        .route(
            "/citizens/national-id/{national_id}",
            get(routes::citizens::get_by_national_id)
                .put(routes::citizens::update)
                .delete(routes::citizens::remove),
        )
        .route("/citizens/{id}", get(routes::citizens::get_by_id))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds application state over the given stores.
pub fn create_state(
    storage: Storage,
    citizens: Arc<dyn CitizenStore>,
    credentials: Arc<dyn CredentialStore>,
    addresses: Arc<dyn AddressStore>,
) -> Arc<AppState> {
    Arc::new(AppState {
        orchestrator: CitizenOrchestrator::new(citizens, credentials, addresses),
        storage,
    })
}

/// Creates application state backed by in-memory stores.
pub fn in_memory_state() -> Arc<AppState> {
    create_state(
        Storage::Memory,
        Arc::new(InMemoryCitizenStore::new()),
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(InMemoryAddressStore::new()),
    )
}

/// Creates application state backed by PostgreSQL. The three stores share
/// the pool but never a transaction.
pub fn postgres_state(pool: PgPool) -> Arc<AppState> {
    create_state(
        Storage::Postgres,
        Arc::new(PostgresCitizenStore::new(pool.clone())),
        Arc::new(PostgresCredentialStore::new(pool.clone())),
        Arc::new(PostgresAddressStore::new(pool)),
    )
}
