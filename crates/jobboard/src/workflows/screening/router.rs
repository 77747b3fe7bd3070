use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ApplicationId, Question};
use super::reconcile::SubmittedAnswers;
use super::repository::{ApplicationRepository, QuestionSetLookup, RepositoryError};
use super::service::{ScreeningService, ScreeningServiceError};

/// Form payload for `POST /api/v1/applications/:id/responses`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerSubmission {
    #[serde(default)]
    pub answers: SubmittedAnswers,
}

/// Question as presented to the applicant, with options already split.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub position: usize,
    pub question_id: String,
    pub text: String,
    pub kind: &'static str,
    pub is_required: bool,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl QuestionView {
    fn from_question(position: usize, question: &Question) -> Self {
        Self {
            position,
            question_id: question.id.0.clone(),
            text: question.text.clone(),
            kind: question.kind.label(),
            is_required: question.is_required,
            options: question.option_list(),
            max_length: question.max_length,
        }
    }
}

/// Router builder exposing the screening question endpoints.
pub fn screening_router<R, Q>(service: Arc<ScreeningService<R, Q>>) -> Router
where
    R: ApplicationRepository + 'static,
    Q: QuestionSetLookup + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications/:application_id/questions",
            get(questions_handler::<R, Q>),
        )
        .route(
            "/api/v1/applications/:application_id/responses",
            get(responses_handler::<R, Q>).post(submit_handler::<R, Q>),
        )
        .with_state(service)
}

pub(crate) async fn questions_handler<R, Q>(
    State(service): State<Arc<ScreeningService<R, Q>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    Q: QuestionSetLookup + 'static,
{
    let id = ApplicationId(application_id);
    match service.questions(&id) {
        Ok(set) => {
            let questions: Vec<QuestionView> = set
                .questions()
                .iter()
                .enumerate()
                .map(|(position, question)| QuestionView::from_question(position, question))
                .collect();
            let payload = json!({
                "application_id": id.0,
                "job_id": set.job_id.0,
                "questions": questions,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(&id, error),
    }
}

pub(crate) async fn responses_handler<R, Q>(
    State(service): State<Arc<ScreeningService<R, Q>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    Q: QuestionSetLookup + 'static,
{
    let id = ApplicationId(application_id);
    match service.responses(&id) {
        Ok(responses) => {
            let payload = json!({
                "application_id": id.0,
                "responses": responses,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(&id, error),
    }
}

pub(crate) async fn submit_handler<R, Q>(
    State(service): State<Arc<ScreeningService<R, Q>>>,
    Path(application_id): Path<String>,
    axum::Json(submission): axum::Json<AnswerSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    Q: QuestionSetLookup + 'static,
{
    let id = ApplicationId(application_id);
    match service.submit_answers(&id, &submission.answers) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(ScreeningServiceError::Validation(errors)) => {
            // echo the trimmed answers so the form can be shown again with its values
            let count = service
                .questions(&id)
                .map(|set| set.len())
                .unwrap_or_else(|_| submission.answers.len());
            let payload = json!({
                "errors": errors,
                "answers": submission.answers.normalized(count),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(&id, error),
    }
}

fn error_response(id: &ApplicationId, error: ScreeningServiceError) -> Response {
    match error {
        ScreeningServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "application_id": id.0,
                "error": "application not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ScreeningServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({
                "error": "response id conflict, please resubmit",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
