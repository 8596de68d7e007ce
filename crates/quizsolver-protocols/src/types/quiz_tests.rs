use super::*;

#[test]
fn test_quiz_request_deserialize() {
    let json = r#"{"email": "a@b.c", "secret": "s3", "url": "https://quiz.example/q1"}"#;
    let req: QuizRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.email, "a@b.c");
    assert_eq!(req.url, "https://quiz.example/q1");
}

#[test]
fn test_quiz_request_missing_field() {
    let json = r#"{"email": "a@b.c", "url": "https://quiz.example/q1"}"#;
    let result: Result<QuizRequest, _> = serde_json::from_str(json);
    assert!(result.is_err());
}

#[test]
fn test_quiz_accepted_body() {
    let body = serde_json::to_value(QuizAccepted::new("a@b.c", "https://q")).unwrap();
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["message"], "Quiz solving process initiated");
    assert_eq!(body["email"], "a@b.c");
    assert_eq!(body["url"], "https://q");
}

#[test]
fn test_submission_result_is_empty() {
    assert!(SubmissionResult::default().is_empty());

    let result = SubmissionResult {
        status_code: Some(200),
        ..Default::default()
    };
    assert!(!result.is_empty());
}

#[test]
fn test_execution_result_failed() {
    let result = ExecutionResult::failed("Timeout: 120s");
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Timeout: 120s"));
    assert!(result.output.is_empty());
    assert!(result.submission.is_empty());
}

#[test]
fn test_sequence_stats_record() {
    let mut stats = SequenceStats::default();
    stats.record(QuizStatus::Correct);
    stats.record(QuizStatus::Correct);
    stats.record(QuizStatus::Incorrect);
    stats.record(QuizStatus::Skipped);
    stats.record(QuizStatus::Error);

    assert_eq!(stats.total, 5);
    assert_eq!(stats.correct, 2);
    assert_eq!(stats.incorrect, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 1);
}

#[test]
fn test_quiz_status_serialize() {
    let json = serde_json::to_string(&QuizStatus::Skipped).unwrap();
    assert_eq!(json, "\"skipped\"");
}

#[test]
fn test_quiz_outcome_error() {
    let outcome = QuizOutcome::error();
    assert_eq!(outcome.status, QuizStatus::Error);
    assert!(outcome.next_url.is_none());
}
