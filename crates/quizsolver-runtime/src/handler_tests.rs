use quizsolver_protocols::{ProviderError, SubmissionResult};

use super::*;
use crate::solver::SolverSettings;
use crate::test_support::{
    FakeRenderer, FakeSubmitter, ScriptedProvider, ScriptedRunner, crashed, silent_run, verdict,
};

struct Harness {
    renderer: Arc<FakeRenderer>,
    provider: Arc<ScriptedProvider>,
    runner: Arc<ScriptedRunner>,
    submitter: Arc<FakeSubmitter>,
    handler: QuizHandler,
}

fn roomy() -> QuizSettings {
    QuizSettings::default()
}

/// Less than twice the skip threshold: no retries.
fn tight() -> QuizSettings {
    QuizSettings {
        timeout: Duration::from_secs(20),
        skip_threshold: Duration::from_secs(15),
        max_retries: 1,
    }
}

fn harness(
    renderer: FakeRenderer,
    provider: ScriptedProvider,
    runner: ScriptedRunner,
    submitter: FakeSubmitter,
    settings: QuizSettings,
) -> Harness {
    let renderer = Arc::new(renderer);
    let provider = Arc::new(provider);
    let runner = Arc::new(runner);
    let submitter = Arc::new(submitter);

    let solver = Arc::new(LlmSolver::new(
        provider.clone(),
        SolverSettings {
            model: "test-model".to_string(),
            temperature: 0.1,
            student_email: "student@example.com".to_string(),
            student_secret: "s3cret".to_string(),
        },
    ));
    let handler = QuizHandler::new(
        renderer.clone(),
        solver,
        runner.clone(),
        submitter.clone(),
        settings,
    );

    Harness {
        renderer,
        provider,
        runner,
        submitter,
        handler,
    }
}

fn fallback_to(next: Option<&str>) -> FakeSubmitter {
    FakeSubmitter::new(Some(SubmissionResult {
        correct: Some(false),
        next_url: next.map(str::to_string),
        reason: None,
        status_code: Some(200),
    }))
}

const URL: &str = "https://quiz.example.com/q1";

#[test]
fn test_settings_from_config() {
    let config = QuizConfig {
        timeout_seconds: 60,
        skip_threshold_seconds: 5,
        max_retries_per_question: 3,
        fallback_answer: "FAILED".to_string(),
    };
    let settings = QuizSettings::from(&config);
    assert_eq!(settings.timeout, Duration::from_secs(60));
    assert_eq!(settings.skip_threshold, Duration::from_secs(5));
    assert_eq!(settings.max_retries, 3);
}

#[tokio::test(start_paused = true)]
async fn test_remaining_and_can_retry() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![]),
        FakeSubmitter::new(None),
        roomy(),
    );
    let start = Instant::now();
    assert_eq!(h.handler.remaining(start), Duration::from_secs(180));
    assert!(h.handler.can_retry(start));

    tokio::time::advance(Duration::from_secs(160)).await;
    assert_eq!(h.handler.remaining(start), Duration::from_secs(20));
    assert!(!h.handler.can_retry(start));

    tokio::time::advance(Duration::from_secs(340)).await;
    assert_eq!(h.handler.remaining(start), Duration::ZERO);
}

#[tokio::test]
async fn test_correct_answer() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![verdict(Some(true), Some("https://quiz.example.com/q2"))]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Correct);
    assert_eq!(outcome.next_url.as_deref(), Some("https://quiz.example.com/q2"));
    assert_eq!(h.renderer.visits(), vec![URL.to_string()]);
    assert_eq!(h.submitter.calls(), 0);
}

#[tokio::test]
async fn test_render_failure_is_error() {
    let h = harness(
        FakeRenderer::failing(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome, QuizOutcome::error());
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn test_generation_failure_regenerates_once() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::new(vec![
            Err(ProviderError::Network("reset".to_string())),
            Ok("print(2)".to_string()),
        ]),
        ScriptedRunner::new(vec![verdict(Some(true), None)]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Correct);
    assert_eq!(h.provider.calls(), 2);
}

#[tokio::test]
async fn test_generation_failure_twice_is_error() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::new(vec![Err(ProviderError::Network("reset".to_string()))]),
        ScriptedRunner::new(vec![]),
        fallback_to(Some("https://quiz.example.com/q2")),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome, QuizOutcome::error());
    assert_eq!(h.provider.calls(), 2);
    assert_eq!(h.submitter.calls(), 0);
}

#[tokio::test]
async fn test_generation_failure_without_time_falls_back() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::new(vec![Err(ProviderError::Timeout(300))]),
        ScriptedRunner::new(vec![]),
        fallback_to(Some("https://quiz.example.com/q2")),
        tight(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Incorrect);
    assert_eq!(outcome.next_url.as_deref(), Some("https://quiz.example.com/q2"));
    assert_eq!(h.provider.calls(), 1);
    assert_eq!(*h.submitter.submitted.lock().unwrap(), vec![URL.to_string()]);
}

#[tokio::test]
async fn test_crash_retries_with_fix() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::new(vec![Ok("1/0".to_string()), Ok("print('fixed')".to_string())]),
        ScriptedRunner::new(vec![
            crashed("ZeroDivisionError: division by zero"),
            verdict(Some(true), Some("https://quiz.example.com/q2")),
        ]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Correct);
    assert_eq!(outcome.next_url.as_deref(), Some("https://quiz.example.com/q2"));

    let fix_request = h.provider.last_request();
    assert!(fix_request.prompt.contains("ZeroDivisionError"));
    assert_eq!(*h.runner.codes.lock().unwrap(), vec!["1/0", "print('fixed')"]);
}

#[tokio::test]
async fn test_crash_after_fix_is_error() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("1/0"),
        ScriptedRunner::new(vec![crashed("ZeroDivisionError: division by zero")]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome, QuizOutcome::error());
    assert_eq!(h.runner.calls(), 2);
}

#[tokio::test]
async fn test_crash_without_time_falls_back() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("1/0"),
        ScriptedRunner::new(vec![crashed("ZeroDivisionError: division by zero")]),
        fallback_to(None),
        tight(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome, QuizOutcome::new(QuizStatus::Incorrect, None));
    assert_eq!(h.runner.calls(), 1);
    assert_eq!(h.submitter.calls(), 1);
}

#[tokio::test]
async fn test_fallback_request_failure_is_error() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![crashed("NameError: name 'x' is not defined")]),
        FakeSubmitter::new(None),
        tight(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome, QuizOutcome::error());
}

#[tokio::test]
async fn test_silent_run_falls_back() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("pass"),
        ScriptedRunner::new(vec![silent_run()]),
        fallback_to(Some("https://quiz.example.com/q2")),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Incorrect);
    assert_eq!(outcome.next_url.as_deref(), Some("https://quiz.example.com/q2"));
}

#[tokio::test]
async fn test_incorrect_retries_with_feedback() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::new(vec![Ok("print(41)".to_string()), Ok("print(42)".to_string())]),
        ScriptedRunner::new(vec![
            verdict(Some(false), Some("https://quiz.example.com/q2")),
            verdict(Some(true), None),
        ]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Correct);
    // The retry gave no URL, so the first attempt's is kept.
    assert_eq!(outcome.next_url.as_deref(), Some("https://quiz.example.com/q2"));

    let retry_prompt = &h.provider.last_request().prompt;
    assert!(retry_prompt.contains("PREVIOUS ATTEMPT FAILED:\nWrong answer"));
    assert!(retry_prompt.contains("PREVIOUS CODE:\nprint(41)"));
}

#[tokio::test]
async fn test_incorrect_twice_stays_incorrect() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(0)"),
        ScriptedRunner::new(vec![
            verdict(Some(false), Some("https://quiz.example.com/q2")),
            verdict(Some(false), Some("https://quiz.example.com/q3")),
        ]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Incorrect);
    assert_eq!(outcome.next_url.as_deref(), Some("https://quiz.example.com/q3"));
    assert_eq!(h.runner.calls(), 2);
}

#[tokio::test]
async fn test_incorrect_without_time_skips() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(0)"),
        ScriptedRunner::new(vec![verdict(Some(false), Some("https://quiz.example.com/q2"))]),
        FakeSubmitter::new(None),
        tight(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Skipped);
    assert_eq!(outcome.next_url.as_deref(), Some("https://quiz.example.com/q2"));
    assert_eq!(h.runner.calls(), 1);
}

#[tokio::test]
async fn test_incorrect_without_time_or_url() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(0)"),
        ScriptedRunner::new(vec![verdict(Some(false), None)]),
        FakeSubmitter::new(None),
        tight(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome, QuizOutcome::new(QuizStatus::Incorrect, None));
}

#[tokio::test]
async fn test_unknown_verdict_is_error() {
    let mut result = verdict(None, None);
    result.submission.status_code = Some(500);
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(0)"),
        ScriptedRunner::new(vec![result]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome, QuizOutcome::error());
}

#[tokio::test(start_paused = true)]
async fn test_retry_out_of_time() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![]),
        FakeSubmitter::new(None),
        roomy(),
    );
    let start = Instant::now();
    tokio::time::advance(Duration::from_secs(170)).await;
    let question = QuestionData::default();

    let outcome = h.handler.retry_with_fix(&question, URL, "1/0", "boom", start).await;
    assert_eq!(outcome, QuizOutcome::error());
    assert_eq!(h.provider.calls(), 0);

    let outcome = h
        .handler
        .retry_with_feedback(&question, URL, "wrong", "print(0)", "", start)
        .await;
    assert_eq!(outcome, QuizOutcome::new(QuizStatus::Incorrect, None));
    assert_eq!(h.runner.calls(), 0);
}

#[tokio::test]
async fn test_retry_with_feedback_silent_run_is_error() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("pass"),
        ScriptedRunner::new(vec![silent_run()]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let outcome = h
        .handler
        .retry_with_feedback(&QuestionData::default(), URL, "wrong", "print(0)", "", Instant::now())
        .await;
    assert_eq!(outcome, QuizOutcome::error());
}

#[tokio::test]
async fn test_extra_retry_rounds() {
    let mut settings = roomy();
    settings.max_retries = 2;
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![
            crashed("KeyError: 'value'"),
            crashed("KeyError: 'Value'"),
            verdict(Some(true), None),
        ]),
        FakeSubmitter::new(None),
        settings,
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Correct);
    assert_eq!(h.runner.calls(), 3);
}

#[tokio::test]
async fn test_no_retries_configured() {
    let mut settings = roomy();
    settings.max_retries = 0;
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![crashed("KeyError: 'value'")]),
        fallback_to(None),
        settings,
    );

    let outcome = h.handler.solve_single_quiz(URL, Instant::now()).await;
    assert_eq!(outcome.status, QuizStatus::Incorrect);
    assert_eq!(h.runner.calls(), 1);
    assert_eq!(h.submitter.calls(), 1);
}

#[tokio::test]
async fn test_sequence_follows_chain() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![
            verdict(Some(true), Some("https://quiz.example.com/q2")),
            verdict(Some(true), Some("https://quiz.example.com/q3")),
            verdict(Some(true), None),
        ]),
        FakeSubmitter::new(None),
        roomy(),
    );

    let stats = h.handler.solve_quiz_sequence(URL, Instant::now()).await;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.correct, 3);
    assert_eq!(
        h.renderer.visits(),
        vec![
            URL.to_string(),
            "https://quiz.example.com/q2".to_string(),
            "https://quiz.example.com/q3".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_sequence_counts_mixed_outcomes() {
    let h = harness(
        FakeRenderer::new(),
        ScriptedProvider::replying("print(1)"),
        ScriptedRunner::new(vec![
            verdict(Some(false), Some("https://quiz.example.com/q2")),
            verdict(None, None),
        ]),
        FakeSubmitter::new(None),
        tight(),
    );

    let stats = h.handler.solve_quiz_sequence(URL, Instant::now()).await;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.correct, 0);
}
