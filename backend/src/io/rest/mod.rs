//! # REST API Interface Layer
//!
//! HTTP endpoints for the enrollment panel.
//!
//! - `GET  /api/children/:child_id/enrollments` enrollment overview for one viewer
//! - `GET  /api/staff/eligible` staff that may serve a service
//! - `GET  /api/enrollments/deactivation-reasons` reason choices for both modals
//! - `POST /api/enrollments/:id/change-staff`
//! - `POST /api/enrollments/:id/deactivate`
//! - `POST /api/enrollments/:id/reactivate`
//!
//! Failures come back as an `ErrorResponse` body. The status code follows the
//! error kind: 400 invalid request, 404 not found, 409 conflict, 500 persistence.

pub mod enrollment_apis;
pub mod mappers;
pub mod staff_apis;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use log::warn;

use crate::domain::errors::EnrollmentError;
use crate::AppState;

/// All API routes, to be nested under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(enrollment_apis::router())
        .merge(staff_apis::router())
}

pub fn status_for(error: &EnrollmentError) -> StatusCode {
    match error {
        EnrollmentError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        EnrollmentError::NotFound(_) => StatusCode::NOT_FOUND,
        EnrollmentError::Conflict(_) => StatusCode::CONFLICT,
        EnrollmentError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error body shown inline in the modal that triggered the request
pub fn error_response(error: &EnrollmentError) -> Response {
    (status_for(error), Json(error.to_response())).into_response()
}

/// A request body or query string that could not be parsed, answered as
/// `InvalidRequest` in the usual error payload
pub struct MalformedRequest(EnrollmentError);

impl From<JsonRejection> for MalformedRequest {
    fn from(rejection: JsonRejection) -> Self {
        MalformedRequest(EnrollmentError::invalid(rejection.body_text()))
    }
}

impl From<QueryRejection> for MalformedRequest {
    fn from(rejection: QueryRejection) -> Self {
        MalformedRequest(EnrollmentError::invalid(rejection.body_text()))
    }
}

impl IntoResponse for MalformedRequest {
    fn into_response(self) -> Response {
        warn!("Rejected malformed request: {}", self.0);
        error_response(&self.0)
    }
}

/// `Json` extractor whose rejection uses the error payload
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(MalformedRequest))]
pub struct ApiJson<T>(pub T);

/// `Query` extractor whose rejection uses the error payload
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(MalformedRequest))]
pub struct ApiQuery<T>(pub T);
