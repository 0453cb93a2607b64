//! # REST API for the Staff Directory

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};
use shared::{EligibleStaffRequest, EligibleStaffResponse};

use crate::io::rest::{error_response, ApiQuery};
use crate::io::rest::mappers::enrollment_mapper::EnrollmentMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/staff/eligible", get(get_eligible_staff))
}

/// Staff that may serve a service, specialists first
pub async fn get_eligible_staff(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EligibleStaffRequest>,
) -> impl IntoResponse {
    info!("GET /api/staff/eligible - query: {:?}", query);

    match state
        .enrollment_service
        .list_eligible_staff(query.service_type, &query.service_name)
        .await
    {
        Ok(staff) => {
            let response = EligibleStaffResponse {
                staff: staff
                    .into_iter()
                    .map(|member| EnrollmentMapper::staff_to_option(member, &query.service_name))
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list eligible staff: {:#}", e);
            error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::files::test_utils::{TestEnvironment, SAMPLE_STAFF_CSV};
    use crate::{create_router, initialize_backend};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_eligible_staff_api() {
        let env = TestEnvironment::with_staff(SAMPLE_STAFF_CSV).await.unwrap();
        let app = create_router(initialize_backend(env.connection.clone()).await.unwrap()).unwrap();

        let request = Request::builder()
            .uri("/api/staff/eligible?service_type=Therapy&service_name=Occupational%20Therapy")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: EligibleStaffResponse = serde_json::from_slice(&bytes).unwrap();
        let ids: Vec<_> = body.staff.iter().map(|s| s.staff_id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2", "T3"]);
        assert!(body.staff[0].specialization_match);
        assert!(!body.staff[2].specialization_match);
    }

    #[tokio::test]
    async fn test_unknown_service_type_is_bad_request() {
        let env = TestEnvironment::with_staff(SAMPLE_STAFF_CSV).await.unwrap();
        let app = create_router(initialize_backend(env.connection.clone()).await.unwrap()).unwrap();

        let request = Request::builder()
            .uri("/api/staff/eligible?service_type=Swimming&service_name=Laps")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: shared::ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.kind, shared::ErrorKind::InvalidRequest);
    }
}
