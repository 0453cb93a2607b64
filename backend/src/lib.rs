//! # Therapy Center Backend
//!
//! Service-enrollment lifecycle for the center portal: who serves each child's
//! therapies and group classes, the history of past assignments, and switching
//! services off and back on.
//!
//! ## Architecture
//!
//! ```text
//! Portal frontend
//!     ↓
//! IO Layer (REST API, mappers)
//!     ↓
//! Domain Layer (state machine, history, projection, enrollment service)
//!     ↓
//! Storage Layer (YAML enrollment documents, CSV staff directory)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::BackendConfig;
use crate::domain::EnrollmentService;
use crate::storage::{EnrollmentRepository, FileConnection, StaffRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub enrollment_service: EnrollmentService,
    pub config: Arc<BackendConfig>,
}

/// Initialize the backend with all required services
pub async fn initialize_backend(connection: FileConnection) -> Result<AppState> {
    info!("Using data directory {}", connection.base_directory().display());
    let config = BackendConfig::load(&connection)?;
    connection.ensure_enrollments_directory()?;

    info!("Setting up storage");
    let enrollment_repository = Arc::new(EnrollmentRepository::new(connection.clone()));
    let staff_repository = Arc::new(StaffRepository::new(connection));

    info!("Setting up domain model");
    let enrollment_service = EnrollmentService::new(
        enrollment_repository,
        staff_repository,
        config.deactivation_reasons(),
    );

    Ok(AppState {
        enrollment_service,
        config: Arc::new(config),
    })
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Result<Router> {
    let origin = app_state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid allowed_origin: {}", app_state.config.allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Ok(Router::new()
        .nest("/api", io::rest::router())
        .layer(cors)
        .with_state(app_state))
}
