use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ApplicationId, ApplicationRecord, QuestionResponse, QuestionSet};
use super::ids::ResponseIdSequence;
use super::reconcile::{reconcile, ResponseBatch, SubmittedAnswers, ValidationErrors};
use super::repository::{ApplicationRepository, QuestionSetLookup, RepositoryError};

type Clock = dyn Fn() -> DateTime<Utc> + Send + Sync;

/// Result of a committed answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreeningOutcome {
    pub application_id: ApplicationId,
    pub inserted: usize,
    pub updated: usize,
    pub responses: Vec<QuestionResponse>,
}

/// Service composing the question lookup, response store, and id sequence.
pub struct ScreeningService<R, Q> {
    repository: Arc<R>,
    questions: Arc<Q>,
    sequence: ResponseIdSequence,
    clock: Box<Clock>,
}

impl<R, Q> ScreeningService<R, Q>
where
    R: ApplicationRepository + 'static,
    Q: QuestionSetLookup + 'static,
{
    pub fn new(repository: Arc<R>, questions: Arc<Q>, sequence: ResponseIdSequence) -> Self {
        Self::with_clock(repository, questions, sequence, Utc::now)
    }

    pub fn with_clock<C>(
        repository: Arc<R>,
        questions: Arc<Q>,
        sequence: ResponseIdSequence,
        clock: C,
    ) -> Self
    where
        C: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            repository,
            questions,
            sequence,
            clock: Box::new(clock),
        }
    }

    /// Ordered questions the applicant has to answer for this application's job.
    pub fn questions(
        &self,
        application_id: &ApplicationId,
    ) -> Result<QuestionSet, ScreeningServiceError> {
        let application = self.application(application_id)?;
        self.question_set(&application)
    }

    /// Stored answers for an application.
    pub fn responses(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<QuestionResponse>, ScreeningServiceError> {
        self.application(application_id)?;
        Ok(self.repository.responses(application_id)?)
    }

    /// Validate and persist the applicant's answers in one batch.
    ///
    /// A duplicate id from a concurrent writer outside this process triggers one reseed and
    /// retry before the conflict is surfaced.
    pub fn submit_answers(
        &self,
        application_id: &ApplicationId,
        submitted: &SubmittedAnswers,
    ) -> Result<ScreeningOutcome, ScreeningServiceError> {
        let application = self.application(application_id)?;
        let question_set = self.question_set(&application)?;

        match self.reconcile_and_commit(&application, &question_set, submitted) {
            Err(ScreeningServiceError::Repository(RepositoryError::Conflict)) => {
                warn!(
                    application_id = %application.id.0,
                    "response id conflict, reseeding sequence and retrying"
                );
                self.sequence.invalidate();
                self.reconcile_and_commit(&application, &question_set, submitted)
            }
            other => other,
        }
    }

    fn reconcile_and_commit(
        &self,
        application: &ApplicationRecord,
        question_set: &QuestionSet,
        submitted: &SubmittedAnswers,
    ) -> Result<ScreeningOutcome, ScreeningServiceError> {
        let mut lease = self.sequence.lease(|| {
            self.repository
                .response_ids(self.sequence.prefix(), self.sequence.width())
        })?;
        // read under the lease so no other submission commits between this read and our write
        let existing = self.repository.responses(&application.id)?;

        let batch = match reconcile(
            application,
            question_set.questions(),
            &existing,
            submitted,
            &mut lease,
            (self.clock)(),
        ) {
            Ok(batch) => batch,
            Err(errors) => {
                warn!(
                    application_id = %application.id.0,
                    failed_questions = errors.len(),
                    "screening answers rejected"
                );
                return Err(ScreeningServiceError::Validation(errors));
            }
        };

        if !batch.is_empty() {
            self.repository.commit(&batch)?;
        }
        let ids_issued = lease.issued();
        lease.commit();

        info!(
            application_id = %application.id.0,
            inserted = batch.inserted.len(),
            updated = batch.updated.len(),
            ids_issued,
            "screening answers stored"
        );

        Ok(outcome(batch, existing, question_set))
    }

    fn application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    fn question_set(
        &self,
        application: &ApplicationRecord,
    ) -> Result<QuestionSet, ScreeningServiceError> {
        let set = self
            .questions
            .question_set(&application.job_id)?
            .unwrap_or_else(|| QuestionSet::empty(application.job_id.clone()));
        Ok(set)
    }
}

/// Responses after the batch, in question order, followed by answers to retired questions.
fn outcome(
    batch: ResponseBatch,
    existing: Vec<QuestionResponse>,
    question_set: &QuestionSet,
) -> ScreeningOutcome {
    let inserted = batch.inserted.len();
    let updated = batch.updated.len();

    let mut written: Vec<QuestionResponse> =
        batch.updated.into_iter().chain(batch.inserted).collect();
    let mut responses = Vec::with_capacity(written.len() + existing.len());
    for question in question_set.questions() {
        if let Some(index) = written
            .iter()
            .position(|response| response.question_id == question.id)
        {
            responses.push(written.swap_remove(index));
        }
    }
    responses.extend(
        existing
            .into_iter()
            .filter(|response| !question_set.contains(&response.question_id)),
    );

    ScreeningOutcome {
        application_id: batch.application_id,
        inserted,
        updated,
        responses,
    }
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
