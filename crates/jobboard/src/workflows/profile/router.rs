use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::repository::ProfileLookup;
use super::service::ProfileService;
use crate::workflows::screening::domain::JobSeekerId;

/// Router builder exposing the profile completeness endpoint.
pub fn profile_router<P>(service: Arc<ProfileService<P>>) -> Router
where
    P: ProfileLookup + 'static,
{
    Router::new()
        .route(
            "/api/v1/job-seekers/:job_seeker_id/completeness",
            get(completeness_handler::<P>),
        )
        .with_state(service)
}

pub(crate) async fn completeness_handler<P>(
    State(service): State<Arc<ProfileService<P>>>,
    Path(job_seeker_id): Path<String>,
) -> Response
where
    P: ProfileLookup + 'static,
{
    let id = JobSeekerId(job_seeker_id);
    match service.completeness(&id) {
        Ok(report) => {
            let payload = json!({
                "job_seeker_id": id.0,
                "score": report.score,
                "complete": report.is_complete(),
                "hints": report.hints(),
                "components": report.components,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
