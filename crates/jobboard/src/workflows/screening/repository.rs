use std::collections::BTreeSet;

use super::domain::{ApplicationId, ApplicationRecord, JobId, QuestionResponse, QuestionSet};
use super::reconcile::ResponseBatch;

/// Read access to the employer-authored screening questions.
pub trait QuestionSetLookup: Send + Sync {
    /// Active questions for `job_id`. Jobs without questions yield `None` or an empty set.
    fn question_set(&self, job_id: &JobId) -> Result<Option<QuestionSet>, RepositoryError>;
}

/// Storage abstraction for applications and their stored answers.
pub trait ApplicationRepository: Send + Sync {
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;

    fn responses(&self, id: &ApplicationId) -> Result<Vec<QuestionResponse>, RepositoryError>;

    /// Every stored response id of the form `prefix` followed by `width` characters.
    fn response_ids(&self, prefix: &str, width: usize) -> Result<BTreeSet<String>, RepositoryError>;

    /// Apply all inserts and updates of `batch`, or none of them.
    ///
    /// An insert whose id is already taken, or whose application already has a response to
    /// the same question, must fail the batch with [`RepositoryError::Conflict`].
    fn commit(&self, batch: &ResponseBatch) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
