//! Recovery of the quiz server verdict from solution stdout.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use quizsolver_protocols::SubmissionResult;

use crate::python_literal;

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Status|STATUS|REQUEST_STATUS)(?:\s+Code)?:\s*(\d+)").expect("static regex")
});

static RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:Response|RESPONSE|SERVER_RESPONSE)(?:\s+Body)?:\s*(\{.*?\})")
        .expect("static regex")
});

static FALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{[^{}]*["']correct["'][^{}]*\}"#).expect("static regex")
});

/// Extract status code, correctness, next URL and reason from program output.
///
/// Accepts the labelled format (`REQUEST_STATUS:` / `SERVER_RESPONSE:`) and
/// the looser `Status Code:` / `Response Body:` variants. Bodies may be JSON
/// or a Python dict repr. When no labelled body yields a verdict, any flat
/// `{...}` blob mentioning `correct` is tried in order.
pub fn parse_submission_result(output: &str) -> SubmissionResult {
    let mut submission = SubmissionResult::default();

    if let Some(caps) = STATUS_RE.captures(output) {
        submission.status_code = caps[1].parse().ok();
        debug!(status_code = ?submission.status_code, "Found submission status");
    }

    if let Some(caps) = RESPONSE_RE.captures(output) {
        match parse_dict(&caps[1]) {
            Some(data) => {
                apply_fields(&mut submission, &data);
                info!(
                    correct = ?submission.correct,
                    next_url = ?submission.next_url,
                    "Parsed submission response"
                );
            }
            None => warn!("Could not parse submission response as JSON or Python dict"),
        }
    }

    if submission.correct.is_none() {
        for candidate in FALLBACK_RE.find_iter(output) {
            if let Some(data) = parse_dict(candidate.as_str()) {
                apply_fields(&mut submission, &data);
                info!("Recovered submission verdict from unlabelled output");
                break;
            }
        }
    }

    submission
}

fn parse_dict(text: &str) -> Option<Value> {
    let value = serde_json::from_str::<Value>(text)
        .ok()
        .or_else(|| python_literal::parse(text).ok())?;
    value.is_object().then_some(value)
}

fn apply_fields(submission: &mut SubmissionResult, data: &Value) {
    submission.correct = data.get("correct").and_then(Value::as_bool);
    submission.next_url = non_empty_str(data, "url").or_else(|| non_empty_str(data, "next_url"));
    submission.reason = data.get("reason").and_then(|r| match r {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });
}

fn non_empty_str(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
