use crate::infra::{sample_data, SAMPLE_APPLICATION, SAMPLE_JOB_SEEKER};
use crate::server::seed_error;
use clap::Args;
use jobboard::config::ScreeningConfig;
use jobboard::error::AppError;
use jobboard::workflows::profile::{CompletenessReport, ProfileService};
use jobboard::workflows::screening::{
    ApplicationId, JobSeekerId, QuestionSet, ScreeningOutcome, ScreeningService,
    ScreeningServiceError, SubmittedAnswers,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Answer for the next question, in display order. Repeat once per question.
    #[arg(long = "answer")]
    pub(crate) answers: Vec<String>,
    /// Submit the same answers a second time to show in-place updates.
    #[arg(long)]
    pub(crate) resubmit: bool,
    /// Skip the profile completeness portion of the demo.
    #[arg(long)]
    pub(crate) skip_profile: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        answers,
        resubmit,
        skip_profile,
    } = args;

    let data = sample_data().map_err(seed_error)?;
    let screening = ScreeningService::new(
        data.applications,
        data.questions,
        ScreeningConfig::default().response_id_sequence(),
    );
    let application_id = ApplicationId(SAMPLE_APPLICATION.to_string());

    println!("Screening demo for application {}", application_id.0);
    let questions = screening.questions(&application_id)?;
    render_questions(&questions);

    let answers = if answers.is_empty() {
        vec!["4".to_string(), "Yes".to_string(), "  A CLI for tidying job feeds  ".to_string()]
    } else {
        answers
    };
    let submitted = SubmittedAnswers::from(answers);

    let rounds = if resubmit { 2 } else { 1 };
    for round in 1..=rounds {
        println!("\nSubmission #{round}");
        match screening.submit_answers(&application_id, &submitted) {
            Ok(outcome) => render_outcome(&outcome),
            Err(ScreeningServiceError::Validation(errors)) => {
                println!("  Rejected: {errors}");
                let entered = submitted.normalized(questions.len());
                for position in errors.positions() {
                    println!(
                        "  - Q{} ({:?}): {}",
                        position + 1,
                        entered.get(position).map(String::as_str).unwrap_or_default(),
                        errors.messages(position).join("; ")
                    );
                }
                break;
            }
            Err(other) => return Err(other.into()),
        }
    }

    if skip_profile {
        return Ok(());
    }

    let profiles = ProfileService::new(data.profiles);
    let job_seeker_id = JobSeekerId(SAMPLE_JOB_SEEKER.to_string());
    let report = profiles.completeness(&job_seeker_id)?;
    println!("\nProfile completeness for {}", job_seeker_id.0);
    render_completeness(&report);

    Ok(())
}

fn render_questions(questions: &QuestionSet) {
    for (position, question) in questions.questions().iter().enumerate() {
        let required = if question.is_required { "*" } else { "" };
        println!("  Q{}{} {}", position + 1, required, question.text);
        let options = question.option_list();
        if !options.is_empty() {
            println!("     options: {}", options.join(" / "));
        }
    }
}

fn render_outcome(outcome: &ScreeningOutcome) {
    println!(
        "  Stored {} new and {} updated responses",
        outcome.inserted, outcome.updated
    );
    for response in &outcome.responses {
        println!(
            "  - {} -> {}: {:?}",
            response.id.as_str(),
            response.question_id.0,
            response.answer
        );
    }
}

fn render_completeness(report: &CompletenessReport) {
    println!("  Score: {}/100", report.score);
    for hint in report.hints() {
        println!("  - {hint}");
    }
}
