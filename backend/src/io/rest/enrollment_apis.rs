//! # REST API for Service Enrollments
//!
//! Endpoints behind the enrollment panel: the per-child overview, the reason
//! choices for the modals, and the three lifecycle transitions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::{error, info, warn};
use shared::{
    ChangeStaffRequest, DeactivateServiceRequest, EnrollmentOverviewRequest, ReactivateServiceRequest,
};

use crate::domain::commands::enrollment::{
    ChangeStaffCommand, DeactivateServiceCommand, EnrollmentOverviewQuery, ReactivateServiceCommand,
};
use crate::domain::errors::EnrollmentError;
use crate::domain::state_machine::StaffChangeReason;
use crate::io::rest::{error_response, ApiJson, ApiQuery};
use crate::io::rest::mappers::enrollment_mapper::EnrollmentMapper;
use crate::AppState;

/// Create a router for enrollment related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/children/:child_id/enrollments", get(get_child_enrollments))
        .route("/enrollments/deactivation-reasons", get(get_reason_options))
        .route("/enrollments/:enrollment_id/change-staff", post(change_staff))
        .route("/enrollments/:enrollment_id/deactivate", post(deactivate_service))
        .route("/enrollments/:enrollment_id/reactivate", post(reactivate_service))
}

fn log_failure(operation: &str, enrollment_id: &str, e: &EnrollmentError) {
    match e {
        EnrollmentError::Persistence(source) => {
            error!("Failed to {} {}: {:#}", operation, enrollment_id, source)
        }
        other => warn!("Failed to {} {}: {}", operation, enrollment_id, other),
    }
}

/// Enrollments of one child, split for the panel and filtered for the viewer
pub async fn get_child_enrollments(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    ApiQuery(query): ApiQuery<EnrollmentOverviewRequest>,
) -> impl IntoResponse {
    info!("GET /api/children/{}/enrollments - query: {:?}", child_id, query);

    let command = EnrollmentOverviewQuery {
        child_id,
        viewer_role: query.viewer_role,
        viewer_id: query.viewer_id,
    };

    match state.enrollment_service.overview(command).await {
        Ok(overview) => {
            let response = EnrollmentMapper::to_overview_response(overview, state.enrollment_service.now());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to load enrollments: {:#}", e);
            error_response(&e)
        }
    }
}

/// Reason choices for the deactivate and change-staff modals
pub async fn get_reason_options(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/enrollments/deactivation-reasons");

    let response = EnrollmentMapper::to_reason_options(state.enrollment_service.deactivation_reasons());
    (StatusCode::OK, Json(response)).into_response()
}

/// Replace the staff member on an active enrollment
pub async fn change_staff(
    State(state): State<AppState>,
    Path(enrollment_id): Path<String>,
    ApiJson(request): ApiJson<ChangeStaffRequest>,
) -> impl IntoResponse {
    info!("POST /api/enrollments/{}/change-staff - request: {:?}", enrollment_id, request);

    let command = ChangeStaffCommand {
        enrollment_id: enrollment_id.clone(),
        new_staff_id: request.new_staff_id,
        reason: StaffChangeReason {
            reason: request.reason,
            notes: request.reason_notes,
        },
        actor_id: request.actor_id,
    };

    match state.enrollment_service.change_staff(command).await {
        Ok(result) => {
            let response = EnrollmentMapper::to_transition_response(result, state.enrollment_service.now());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            log_failure("change staff on", &enrollment_id, &e);
            error_response(&e)
        }
    }
}

/// Deactivate an active enrollment
pub async fn deactivate_service(
    State(state): State<AppState>,
    Path(enrollment_id): Path<String>,
    ApiJson(request): ApiJson<DeactivateServiceRequest>,
) -> impl IntoResponse {
    info!("POST /api/enrollments/{}/deactivate - request: {:?}", enrollment_id, request);

    let command = DeactivateServiceCommand {
        enrollment_id: enrollment_id.clone(),
        reason: request.reason,
        other_reason: request.other_reason,
        confirmation: request.confirmation,
        actor_id: request.actor_id,
    };

    match state.enrollment_service.deactivate_service(command).await {
        Ok(result) => {
            let response = EnrollmentMapper::to_transition_response(result, state.enrollment_service.now());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            log_failure("deactivate", &enrollment_id, &e);
            error_response(&e)
        }
    }
}

/// Reactivate an inactive enrollment with a new staff member
pub async fn reactivate_service(
    State(state): State<AppState>,
    Path(enrollment_id): Path<String>,
    ApiJson(request): ApiJson<ReactivateServiceRequest>,
) -> impl IntoResponse {
    info!("POST /api/enrollments/{}/reactivate - request: {:?}", enrollment_id, request);

    let command = ReactivateServiceCommand {
        enrollment_id: enrollment_id.clone(),
        new_staff_id: request.new_staff_id,
        actor_id: request.actor_id,
    };

    match state.enrollment_service.reactivate_service(command).await {
        Ok(result) => {
            let response = EnrollmentMapper::to_transition_response(result, state.enrollment_service.now());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            log_failure("reactivate", &enrollment_id, &e);
            error_response(&e)
        }
    }
}
