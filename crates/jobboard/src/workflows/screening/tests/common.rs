use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::screening::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, JobId, JobSeekerId, Question, QuestionId,
    QuestionKind, QuestionResponse, QuestionResponseId, QuestionSet,
};
use crate::workflows::screening::reconcile::ResponseBatch;
use crate::workflows::screening::repository::{
    ApplicationRepository, QuestionSetLookup, RepositoryError,
};
use crate::workflows::screening::{ResponseIdSequence, ScreeningService};

pub(super) const JOB: &str = "job-backend";
pub(super) const APPLICATION: &str = "app-001";
pub(super) const SECOND_APPLICATION: &str = "app-002";

pub(super) fn answered_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn question(
    id: &str,
    order: i32,
    kind: QuestionKind,
    is_required: bool,
    max_length: Option<usize>,
) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        order,
        text: format!("Question {id}"),
        kind,
        is_required,
        options: None,
        max_length,
    }
}

/// Three questions authored out of order: years (required, max 3), motivation (optional,
/// max 20), licence (required yes/no).
pub(super) fn question_set() -> QuestionSet {
    let mut licence = question("q-licence", 3, QuestionKind::YesNo, true, None);
    licence.options = Some("Yes; No".to_string());

    QuestionSet::new(
        JobId(JOB.to_string()),
        vec![
            licence,
            question("q-years", 1, QuestionKind::Number, true, Some(3)),
            question("q-motivation", 2, QuestionKind::Text, false, Some(20)),
        ],
    )
}

pub(super) fn application(id: &str) -> ApplicationRecord {
    ApplicationRecord {
        id: ApplicationId(id.to_string()),
        job_id: JobId(JOB.to_string()),
        job_seeker_id: JobSeekerId(format!("js-{id}")),
        status: ApplicationStatus::Submitted,
    }
}

pub(super) fn stored_response(
    id: &str,
    application_id: &str,
    question_id: &str,
    answer: &str,
) -> QuestionResponse {
    QuestionResponse {
        id: QuestionResponseId(id.to_string()),
        application_id: ApplicationId(application_id.to_string()),
        job_seeker_id: JobSeekerId(format!("js-{application_id}")),
        question_id: QuestionId(question_id.to_string()),
        answer: answer.to_string(),
        answered_at: Utc
            .with_ymd_and_hms(2025, 1, 2, 8, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) applications: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
    pub(super) responses: Arc<Mutex<BTreeMap<QuestionResponseId, QuestionResponse>>>,
    pub(super) commits: Arc<AtomicUsize>,
}

impl MemoryRepository {
    pub(super) fn with_applications(ids: &[&str]) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository
                .applications
                .lock()
                .expect("repository mutex poisoned");
            for id in ids {
                let record = application(id);
                guard.insert(record.id.clone(), record);
            }
        }
        repository
    }

    pub(super) fn seed_response(&self, response: QuestionResponse) {
        self.responses
            .lock()
            .expect("repository mutex poisoned")
            .insert(response.id.clone(), response);
    }

    pub(super) fn response_count(&self) -> usize {
        self.responses
            .lock()
            .expect("repository mutex poisoned")
            .len()
    }

    pub(super) fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl ApplicationRepository for MemoryRepository {
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.applications.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn responses(&self, id: &ApplicationId) -> Result<Vec<QuestionResponse>, RepositoryError> {
        let guard = self.responses.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|response| &response.application_id == id)
            .cloned()
            .collect())
    }

    fn response_ids(
        &self,
        prefix: &str,
        width: usize,
    ) -> Result<BTreeSet<String>, RepositoryError> {
        let guard = self.responses.lock().expect("repository mutex poisoned");
        Ok(guard
            .keys()
            .map(|id| id.0.clone())
            .filter(|id| id.starts_with(prefix) && id.len() == prefix.len() + width)
            .collect())
    }

    fn commit(&self, batch: &ResponseBatch) -> Result<(), RepositoryError> {
        let mut guard = self.responses.lock().expect("repository mutex poisoned");

        for response in &batch.inserted {
            let duplicate_pair = guard.values().any(|stored| {
                stored.application_id == response.application_id
                    && stored.question_id == response.question_id
            });
            if guard.contains_key(&response.id) || duplicate_pair {
                return Err(RepositoryError::Conflict);
            }
        }
        if batch
            .updated
            .iter()
            .any(|response| !guard.contains_key(&response.id))
        {
            return Err(RepositoryError::NotFound);
        }

        for response in batch.inserted.iter().chain(&batch.updated) {
            guard.insert(response.id.clone(), response.clone());
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryQuestions {
    sets: HashMap<JobId, QuestionSet>,
}

impl MemoryQuestions {
    pub(super) fn with_set(set: QuestionSet) -> Self {
        let mut sets = HashMap::new();
        sets.insert(set.job_id.clone(), set);
        Self { sets }
    }
}

impl QuestionSetLookup for MemoryQuestions {
    fn question_set(&self, job_id: &JobId) -> Result<Option<QuestionSet>, RepositoryError> {
        Ok(self.sets.get(job_id).cloned())
    }
}

/// Repository whose first `failures` commits fail, by default as if the database dropped
/// the write.
pub(super) struct FlakyCommitRepository {
    pub(super) inner: MemoryRepository,
    failures: AtomicUsize,
    attempts: AtomicUsize,
    error: fn() -> RepositoryError,
}

impl FlakyCommitRepository {
    pub(super) fn new(inner: MemoryRepository, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
            error: || RepositoryError::Unavailable("write timed out".to_string()),
        }
    }

    /// Commits fail with a duplicate-id conflict, as when another process owns the ids.
    pub(super) fn conflicting(inner: MemoryRepository, failures: usize) -> Self {
        Self {
            error: || RepositoryError::Conflict,
            ..Self::new(inner, failures)
        }
    }

    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ApplicationRepository for FlakyCommitRepository {
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn responses(&self, id: &ApplicationId) -> Result<Vec<QuestionResponse>, RepositoryError> {
        self.inner.responses(id)
    }

    fn response_ids(
        &self,
        prefix: &str,
        width: usize,
    ) -> Result<BTreeSet<String>, RepositoryError> {
        self.inner.response_ids(prefix, width)
    }

    fn commit(&self, batch: &ResponseBatch) -> Result<(), RepositoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err((self.error)());
        }
        self.inner.commit(batch)
    }
}

/// Store that only enforces id uniqueness and is slow to read, leaving a wide gap between a
/// submission reading its existing answers and writing new ones.
pub(super) struct SlowReadRepository {
    pub(super) inner: MemoryRepository,
}

impl SlowReadRepository {
    pub(super) fn responses_to(&self, application_id: &str, question_id: &str) -> usize {
        self.inner
            .responses
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .filter(|response| {
                response.application_id.0 == application_id && response.question_id.0 == question_id
            })
            .count()
    }
}

impl ApplicationRepository for SlowReadRepository {
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn responses(&self, id: &ApplicationId) -> Result<Vec<QuestionResponse>, RepositoryError> {
        let responses = self.inner.responses(id)?;
        thread::sleep(Duration::from_millis(20));
        Ok(responses)
    }

    fn response_ids(
        &self,
        prefix: &str,
        width: usize,
    ) -> Result<BTreeSet<String>, RepositoryError> {
        self.inner.response_ids(prefix, width)
    }

    fn commit(&self, batch: &ResponseBatch) -> Result<(), RepositoryError> {
        let mut guard = self.inner.responses.lock().expect("repository mutex poisoned");
        if batch
            .inserted
            .iter()
            .any(|response| guard.contains_key(&response.id))
        {
            return Err(RepositoryError::Conflict);
        }
        for response in batch.inserted.iter().chain(&batch.updated) {
            guard.insert(response.id.clone(), response.clone());
        }
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn responses(&self, _id: &ApplicationId) -> Result<Vec<QuestionResponse>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn response_ids(
        &self,
        _prefix: &str,
        _width: usize,
    ) -> Result<BTreeSet<String>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit(&self, _batch: &ResponseBatch) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service_with<R: ApplicationRepository + 'static>(
    repository: Arc<R>,
) -> ScreeningService<R, MemoryQuestions> {
    ScreeningService::with_clock(
        repository,
        Arc::new(MemoryQuestions::with_set(question_set())),
        ResponseIdSequence::default(),
        answered_at,
    )
}

pub(super) fn build_service() -> (
    ScreeningService<MemoryRepository, MemoryQuestions>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::with_applications(&[
        APPLICATION,
        SECOND_APPLICATION,
    ]));
    (build_service_with(repository.clone()), repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
