use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobSeekerId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

/// Generated identifier of a stored answer, e.g. `QRS0000042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionResponseId(pub String);

impl QuestionResponseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Input widget requested by the employer for a screening question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    YesNo,
    SingleChoice,
    MultipleChoice,
    Number,
}

impl QuestionKind {
    pub const fn label(self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::YesNo => "yes_no",
            QuestionKind::SingleChoice => "single_choice",
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::Number => "number",
        }
    }
}

/// Employer-defined screening question attached to a job's question set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub order: i32,
    pub text: String,
    pub kind: QuestionKind,
    pub is_required: bool,
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl Question {
    /// Split the stored option text on `;` or line breaks, dropping blank entries.
    pub fn option_list(&self) -> Vec<String> {
        self.options
            .as_deref()
            .unwrap_or_default()
            .split([';', '\n', '\r'])
            .map(str::trim)
            .filter(|option| !option.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Questions for one job, held in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub job_id: JobId,
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(job_id: JobId, mut questions: Vec<Question>) -> Self {
        // stable: equal orders keep their authored sequence
        questions.sort_by_key(|question| question.order);
        Self { job_id, questions }
    }

    pub fn empty(job_id: JobId) -> Self {
        Self::new(job_id, Vec::new())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn contains(&self, question_id: &QuestionId) -> bool {
        self.questions
            .iter()
            .any(|question| &question.id == question_id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// One stored answer, unique per (application, question).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: QuestionResponseId,
    pub application_id: ApplicationId,
    pub job_seeker_id: JobSeekerId,
    pub question_id: QuestionId,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

/// Lifecycle of a job application as seen by the screening flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }
}

/// Repository view of an application, without its responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job_seeker_id: JobSeekerId,
    pub status: ApplicationStatus,
}
