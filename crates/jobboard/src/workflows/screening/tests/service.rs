use super::common::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use crate::workflows::screening::domain::{ApplicationId, JobId};
use crate::workflows::screening::reconcile::{SubmittedAnswers, REQUIRED_MESSAGE};
use crate::workflows::screening::repository::RepositoryError;
use crate::workflows::screening::{ResponseIdSequence, ScreeningService, ScreeningServiceError};

fn app(id: &str) -> ApplicationId {
    ApplicationId(id.to_string())
}

fn valid_answers() -> SubmittedAnswers {
    SubmittedAnswers::from(vec!["4", "  Growth  ", "Yes"])
}

#[test]
fn first_submission_inserts_one_response_per_question() {
    let (service, repository) = build_service();

    let outcome = service
        .submit_answers(&app(APPLICATION), &valid_answers())
        .expect("submission stored");

    assert_eq!(outcome.inserted, 3);
    assert_eq!(outcome.updated, 0);
    assert_eq!(repository.response_count(), 3);
    assert_eq!(repository.commit_count(), 1);

    let ids: Vec<&str> = outcome.responses.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["QRS0000001", "QRS0000002", "QRS0000003"]);
    assert_eq!(outcome.responses[1].answer, "Growth");
}

#[test]
fn repeated_submission_updates_in_place() {
    let (service, repository) = build_service();
    service
        .submit_answers(&app(APPLICATION), &valid_answers())
        .expect("first submission");

    let outcome = service
        .submit_answers(
            &app(APPLICATION),
            &SubmittedAnswers::from(vec!["6", "", "No"]),
        )
        .expect("second submission");

    assert_eq!(outcome.inserted, 0);
    assert_eq!(outcome.updated, 3);
    assert_eq!(repository.response_count(), 3);
    assert_eq!(repository.commit_count(), 2);

    let stored = service.responses(&app(APPLICATION)).expect("responses");
    let answers: BTreeSet<&str> = stored.iter().map(|r| r.answer.as_str()).collect();
    assert_eq!(answers, BTreeSet::from(["6", "", "No"]));
}

#[test]
fn validation_failure_leaves_store_untouched() {
    let (service, repository) = build_service();
    service
        .submit_answers(&app(APPLICATION), &valid_answers())
        .expect("first submission");

    let result = service.submit_answers(
        &app(APPLICATION),
        &SubmittedAnswers::from(vec!["", "", "Yes"]),
    );

    match result {
        Err(ScreeningServiceError::Validation(errors)) => {
            assert_eq!(errors.messages(0), [REQUIRED_MESSAGE.to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(repository.commit_count(), 1);
    let stored = service.responses(&app(APPLICATION)).expect("responses");
    assert!(stored.iter().any(|response| response.answer == "4"));

    let next = service
        .submit_answers(&app(SECOND_APPLICATION), &valid_answers())
        .expect("other application");
    assert_eq!(next.responses[0].id.as_str(), "QRS0000004");
}

#[test]
fn sequence_seeds_from_existing_ids() {
    let (service, repository) = build_service();
    repository.seed_response(stored_response("QRS0000041", "app-legacy", "q-years", "9"));
    repository.seed_response(stored_response("QRS00000XY", "app-legacy", "q-motivation", "?"));

    let outcome = service
        .submit_answers(&app(APPLICATION), &valid_answers())
        .expect("submission stored");

    assert_eq!(outcome.responses[0].id.as_str(), "QRS0000042");
}

#[test]
fn unknown_application_is_not_found() {
    let (service, _) = build_service();

    match service.submit_answers(&app("missing"), &valid_answers()) {
        Err(ScreeningServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
    match service.questions(&app("missing")) {
        Err(ScreeningServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn repository_outage_propagates() {
    let service = build_service_with(Arc::new(UnavailableRepository));

    match service.submit_answers(&app(APPLICATION), &valid_answers()) {
        Err(ScreeningServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected unavailable error, got {other:?}"),
    }
}

#[test]
fn failed_commit_releases_its_ids() {
    let inner = MemoryRepository::with_applications(&[APPLICATION]);
    let repository = Arc::new(FlakyCommitRepository::new(inner, 1));
    let service = build_service_with(repository.clone());

    match service.submit_answers(&app(APPLICATION), &valid_answers()) {
        Err(ScreeningServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected write failure, got {other:?}"),
    }
    assert_eq!(repository.inner.response_count(), 0);

    let outcome = service
        .submit_answers(&app(APPLICATION), &valid_answers())
        .expect("retry succeeds");
    assert_eq!(outcome.responses[0].id.as_str(), "QRS0000001");
}

#[test]
fn conflict_that_survives_the_retry_is_reported() {
    let inner = MemoryRepository::with_applications(&[APPLICATION]);
    let repository = Arc::new(FlakyCommitRepository::conflicting(inner, 2));
    let service = build_service_with(repository.clone());

    match service.submit_answers(&app(APPLICATION), &valid_answers()) {
        Err(ScreeningServiceError::Repository(RepositoryError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(repository.attempts(), 2);
    assert_eq!(repository.inner.response_count(), 0);
    assert_eq!(repository.inner.commit_count(), 0);

    let outcome = service
        .submit_answers(&app(APPLICATION), &valid_answers())
        .expect("store accepts writes again");
    assert_eq!(outcome.responses[0].id.as_str(), "QRS0000001");
}

#[test]
fn conflicting_external_writer_triggers_reseed() {
    let (service, repository) = build_service();
    service
        .submit_answers(&app(APPLICATION), &valid_answers())
        .expect("first submission");

    // another process takes the next id behind this sequence's back
    repository.seed_response(stored_response("QRS0000004", "app-elsewhere", "q-years", "1"));

    let outcome = service
        .submit_answers(&app(SECOND_APPLICATION), &valid_answers())
        .expect("retried after conflict");

    let ids: Vec<&str> = outcome.responses.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["QRS0000005", "QRS0000006", "QRS0000007"]);
    assert_eq!(repository.response_count(), 7);
}

#[test]
fn job_without_questions_accepts_empty_submission() {
    let repository = Arc::new(MemoryRepository::with_applications(&[APPLICATION]));
    let service = ScreeningService::with_clock(
        repository.clone(),
        Arc::new(MemoryQuestions::default()),
        ResponseIdSequence::default(),
        answered_at,
    );

    let questions = service.questions(&app(APPLICATION)).expect("questions");
    assert!(questions.is_empty());
    assert_eq!(questions.job_id, JobId(JOB.to_string()));

    let outcome = service
        .submit_answers(&app(APPLICATION), &SubmittedAnswers::default())
        .expect("nothing to store");
    assert!(outcome.responses.is_empty());
    assert_eq!(repository.commit_count(), 0);
}

#[test]
fn concurrent_submissions_never_share_ids() {
    let ids: Vec<String> = (0..12).map(|n| format!("app-{n:03}")).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let repository = Arc::new(MemoryRepository::with_applications(&id_refs));
    let service = Arc::new(build_service_with(repository.clone()));

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .submit_answers(&ApplicationId(id), &valid_answers())
                    .expect("submission stored")
            })
        })
        .collect();

    let mut seen = BTreeSet::new();
    for handle in handles {
        for response in handle.join().expect("worker finished").responses {
            assert!(seen.insert(response.id), "duplicate response id");
        }
    }
    assert_eq!(seen.len(), 36);
    assert_eq!(repository.response_count(), 36);
}

#[test]
fn concurrent_submissions_for_one_application_keep_one_row_per_question() {
    let repository = Arc::new(SlowReadRepository {
        inner: MemoryRepository::with_applications(&[APPLICATION]),
    });
    let service = Arc::new(build_service_with(repository.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .submit_answers(&app(APPLICATION), &valid_answers())
                    .expect("submission stored")
            })
        })
        .collect();
    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker finished"))
        .collect();

    assert_eq!(outcomes.iter().map(|o| o.inserted).sum::<usize>(), 3);
    assert_eq!(outcomes.iter().map(|o| o.updated).sum::<usize>(), 9);
    assert_eq!(repository.inner.response_count(), 3);
    for question in ["q-years", "q-motivation", "q-licence"] {
        assert_eq!(repository.responses_to(APPLICATION, question), 1);
    }
}
