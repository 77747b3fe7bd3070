use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationRecord, Question, QuestionId, QuestionResponse};
use super::ids::ResponseIdSource;

pub const REQUIRED_MESSAGE: &str = "This field is required";

pub fn max_length_message(max_length: usize) -> String {
    format!("Maximum {max_length} characters")
}

/// Raw answers from the application form, one per question position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedAnswers(pub Vec<Option<String>>);

impl SubmittedAnswers {
    /// Trimmed answer text for each of `count` positions. Missing or null answers become `""`.
    pub fn normalized(&self, count: usize) -> Vec<String> {
        (0..count)
            .map(|position| {
                self.0
                    .get(position)
                    .and_then(Option::as_deref)
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Option<String>>> for SubmittedAnswers {
    fn from(value: Vec<Option<String>>) -> Self {
        Self(value)
    }
}

impl From<Vec<String>> for SubmittedAnswers {
    fn from(value: Vec<String>) -> Self {
        Self(value.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for SubmittedAnswers {
    fn from(value: Vec<&str>) -> Self {
        Self(value.into_iter().map(|answer| Some(answer.to_string())).collect())
    }
}

/// Every validation failure of one submission, keyed by question position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(transparent)]
#[error("{} screening answer(s) failed validation", .by_position.len())]
pub struct ValidationErrors {
    by_position: BTreeMap<usize, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, position: usize, message: impl Into<String>) {
        self.by_position
            .entry(position)
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    /// Number of positions with at least one message.
    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    pub fn messages(&self, position: usize) -> &[String] {
        self.by_position
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_position.keys().copied()
    }

    pub fn into_inner(self) -> BTreeMap<usize, Vec<String>> {
        self.by_position
    }
}

/// Check every question, collecting all failures instead of stopping at the first.
pub fn validate_answers(questions: &[Question], answers: &[String]) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    for (position, question) in questions.iter().enumerate() {
        let answer = answers.get(position).map(String::as_str).unwrap_or_default();

        if question.is_required && answer.is_empty() {
            errors.add(position, REQUIRED_MESSAGE);
        }

        if let Some(max_length) = question.max_length {
            if answer.chars().count() > max_length {
                errors.add(position, max_length_message(max_length));
            }
        }
    }

    errors
}

/// Writes produced by one successful reconciliation. Committed as a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseBatch {
    pub application_id: ApplicationId,
    pub inserted: Vec<QuestionResponse>,
    pub updated: Vec<QuestionResponse>,
}

impl ResponseBatch {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inserted.len() + self.updated.len()
    }
}

/// Merge submitted answers into the application's stored responses.
///
/// Responses are matched by question id. Existing ones are overwritten in place and the
/// rest get an id from `ids`. Nothing is allocated unless every answer validates.
pub fn reconcile<S>(
    application: &ApplicationRecord,
    questions: &[Question],
    existing: &[QuestionResponse],
    submitted: &SubmittedAnswers,
    ids: &mut S,
    answered_at: DateTime<Utc>,
) -> Result<ResponseBatch, ValidationErrors>
where
    S: ResponseIdSource + ?Sized,
{
    let answers = submitted.normalized(questions.len());
    let errors = validate_answers(questions, &answers);
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut stored: HashMap<&QuestionId, &QuestionResponse> = HashMap::new();
    for response in existing {
        stored.entry(&response.question_id).or_insert(response);
    }

    let mut batch = ResponseBatch {
        application_id: application.id.clone(),
        inserted: Vec::new(),
        updated: Vec::new(),
    };

    for (question, answer) in questions.iter().zip(answers) {
        match stored.get(&question.id) {
            Some(current) => batch.updated.push(QuestionResponse {
                answer,
                answered_at,
                ..(*current).clone()
            }),
            None => batch.inserted.push(QuestionResponse {
                id: ids.next_response_id(),
                application_id: application.id.clone(),
                job_seeker_id: application.job_seeker_id.clone(),
                question_id: question.id.clone(),
                answer,
                answered_at,
            }),
        }
    }

    Ok(batch)
}
