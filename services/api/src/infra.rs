use jobboard::workflows::profile::{
    JobSeekerProfile, ProfileLookup, ProfileRelationCounts, ProfileSnapshot,
};
use jobboard::workflows::screening::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus, JobId,
    JobSeekerId, Question, QuestionId, QuestionKind, QuestionResponse, QuestionResponseId,
    QuestionSet, QuestionSetLookup, RepositoryError, ResponseBatch,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, RwLock};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn poisoned(what: &str) -> RepositoryError {
    RepositoryError::Unavailable(format!("{what} lock poisoned"))
}

/// Application store with an all-or-nothing batch commit.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    applications: Arc<RwLock<HashMap<ApplicationId, ApplicationRecord>>>,
    responses: Arc<Mutex<BTreeMap<QuestionResponseId, QuestionResponse>>>,
}

impl InMemoryApplicationRepository {
    pub(crate) fn insert_application(
        &self,
        record: ApplicationRecord,
    ) -> Result<(), RepositoryError> {
        let mut guard = self
            .applications
            .write()
            .map_err(|_| poisoned("applications"))?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self
            .applications
            .read()
            .map_err(|_| poisoned("applications"))?;
        Ok(guard.get(id).cloned())
    }

    fn responses(&self, id: &ApplicationId) -> Result<Vec<QuestionResponse>, RepositoryError> {
        let guard = self.responses.lock().map_err(|_| poisoned("responses"))?;
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
        let guard = self.responses.lock().map_err(|_| poisoned("responses"))?;
        Ok(guard
            .keys()
            .filter(|id| id.0.starts_with(prefix) && id.0.len() == prefix.len() + width)
            .map(|id| id.0.clone())
            .collect())
    }

    fn commit(&self, batch: &ResponseBatch) -> Result<(), RepositoryError> {
        let mut guard = self.responses.lock().map_err(|_| poisoned("responses"))?;

        let id_taken = batch
            .inserted
            .iter()
            .any(|response| guard.contains_key(&response.id));
        let pair_taken = batch.inserted.iter().any(|response| {
            guard.values().any(|stored| {
                stored.application_id == response.application_id
                    && stored.question_id == response.question_id
            })
        });
        if id_taken || pair_taken {
            return Err(RepositoryError::Conflict);
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
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryQuestionSets {
    sets: Arc<RwLock<HashMap<JobId, QuestionSet>>>,
}

impl InMemoryQuestionSets {
    pub(crate) fn publish(&self, set: QuestionSet) -> Result<(), RepositoryError> {
        let mut guard = self.sets.write().map_err(|_| poisoned("question sets"))?;
        guard.insert(set.job_id.clone(), set);
        Ok(())
    }
}

impl QuestionSetLookup for InMemoryQuestionSets {
    fn question_set(&self, job_id: &JobId) -> Result<Option<QuestionSet>, RepositoryError> {
        let guard = self.sets.read().map_err(|_| poisoned("question sets"))?;
        Ok(guard.get(job_id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryProfiles {
    profiles: Arc<RwLock<HashMap<JobSeekerId, ProfileSnapshot>>>,
}

impl InMemoryProfiles {
    pub(crate) fn upsert(
        &self,
        id: JobSeekerId,
        snapshot: ProfileSnapshot,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.profiles.write().map_err(|_| poisoned("profiles"))?;
        guard.insert(id, snapshot);
        Ok(())
    }
}

impl ProfileLookup for InMemoryProfiles {
    fn profile(&self, id: &JobSeekerId) -> Result<Option<ProfileSnapshot>, RepositoryError> {
        let guard = self.profiles.read().map_err(|_| poisoned("profiles"))?;
        Ok(guard.get(id).cloned())
    }
}

/// Collaborators pre-populated with one job, its screening questions, and an applicant.
pub(crate) struct SampleData {
    pub(crate) applications: Arc<InMemoryApplicationRepository>,
    pub(crate) questions: Arc<InMemoryQuestionSets>,
    pub(crate) profiles: Arc<InMemoryProfiles>,
}

pub(crate) const SAMPLE_APPLICATION: &str = "APP0000001";
pub(crate) const SAMPLE_JOB_SEEKER: &str = "JS0000001";
const SAMPLE_JOB: &str = "JOB0000001";

pub(crate) fn sample_data() -> Result<SampleData, RepositoryError> {
    let applications = Arc::new(InMemoryApplicationRepository::default());
    let questions = Arc::new(InMemoryQuestionSets::default());
    let profiles = Arc::new(InMemoryProfiles::default());

    questions.publish(QuestionSet::new(
        JobId(SAMPLE_JOB.to_string()),
        vec![
            Question {
                id: QuestionId("QST0000001".to_string()),
                order: 1,
                text: "How many years of Rust experience do you have?".to_string(),
                kind: QuestionKind::Number,
                is_required: true,
                options: None,
                max_length: Some(2),
            },
            Question {
                id: QuestionId("QST0000002".to_string()),
                order: 2,
                text: "Are you authorized to work in this country?".to_string(),
                kind: QuestionKind::YesNo,
                is_required: true,
                options: Some("Yes;No".to_string()),
                max_length: None,
            },
            Question {
                id: QuestionId("QST0000003".to_string()),
                order: 3,
                text: "Tell us about a project you are proud of.".to_string(),
                kind: QuestionKind::Text,
                is_required: false,
                options: None,
                max_length: Some(500),
            },
        ],
    ))?;

    applications.insert_application(ApplicationRecord {
        id: ApplicationId(SAMPLE_APPLICATION.to_string()),
        job_id: JobId(SAMPLE_JOB.to_string()),
        job_seeker_id: JobSeekerId(SAMPLE_JOB_SEEKER.to_string()),
        status: ApplicationStatus::Submitted,
    })?;

    profiles.upsert(
        JobSeekerId(SAMPLE_JOB_SEEKER.to_string()),
        ProfileSnapshot {
            profile: JobSeekerProfile {
                full_name: Some("Alex Morgan".to_string()),
                email: Some("alex.morgan@example.com".to_string()),
                email_verified: true,
                phone: Some("+1 555 0134".to_string()),
                experience_level: Some("Mid-level".to_string()),
                resume_file_name: Some("alex-morgan-cv.pdf".to_string()),
                ..JobSeekerProfile::default()
            },
            counts: ProfileRelationCounts {
                skills: 6,
                work_experiences: 2,
                educations: 1,
                ..ProfileRelationCounts::default()
            },
        },
    )?;

    Ok(SampleData {
        applications,
        questions,
        profiles,
    })
}
