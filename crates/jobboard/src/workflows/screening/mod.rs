//! Screening questions attached to a job and the applicant's stored answers.
//!
//! Submitted answers are validated as a whole and merged into the existing responses of
//! an application in a single batch. New responses draw their ids from a shared
//! [`ResponseIdSequence`].

pub mod domain;
pub mod ids;
pub mod reconcile;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, JobId, JobSeekerId, Question,
    QuestionId, QuestionKind, QuestionResponse, QuestionResponseId, QuestionSet,
};
pub use ids::{
    next_id, ResponseIdLease, ResponseIdSequence, ResponseIdSource, SequentialIdAllocator,
    DEFAULT_RESPONSE_ID_PREFIX, DEFAULT_RESPONSE_ID_WIDTH,
};
pub use reconcile::{reconcile, ResponseBatch, SubmittedAnswers, ValidationErrors};
pub use repository::{ApplicationRepository, QuestionSetLookup, RepositoryError};
pub use router::{screening_router, AnswerSubmission, QuestionView};
pub use service::{ScreeningOutcome, ScreeningService, ScreeningServiceError};
