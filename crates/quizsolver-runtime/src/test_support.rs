//! Fakes for the seam traits.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use quizsolver_protocols::{
    AnswerSubmitter, BrowserError, CodeRunner, ExecutionResult, Generation, GenerationRequest,
    LLMProvider, PageRenderer, ProviderError, QuestionData, SubmissionResult,
};

/// Replies from a script of outcomes, repeating the last one, and keeps
/// every request.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    last: Mutex<Option<Result<String, ProviderError>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

fn clone_reply(reply: &Result<String, ProviderError>) -> Result<String, ProviderError> {
    match reply {
        Ok(text) => Ok(text.clone()),
        Err(e) => Err(ProviderError::Network(e.to_string())),
    }
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> GenerationRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());

        let reply = match self.replies.lock().unwrap().pop_front() {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(clone_reply(&reply));
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .as_ref()
                .map(clone_reply)
                .unwrap_or_else(|| Err(ProviderError::Network("no reply scripted".to_string()))),
        };

        reply.map(|text| Generation::complete(request.model, text))
    }
}

/// Serves a fixed page, or fails.
pub struct FakeRenderer {
    pub fail: bool,
    pub visits: Mutex<Vec<String>>,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self {
            fail: false,
            visits: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            visits: Mutex::new(Vec::new()),
        }
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn visit_quiz_page(&self, url: &str) -> Result<QuestionData, BrowserError> {
        self.visits.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(BrowserError::NavigationFailed(format!("{}: net::ERR_FAILED", url)));
        }
        Ok(QuestionData {
            question_text: format!("Question at {}", url),
            raw_html: "<html></html>".to_string(),
            url: url.to_string(),
        })
    }
}

/// Returns scripted execution results in order, then the last one again.
pub struct ScriptedRunner {
    results: Mutex<VecDeque<ExecutionResult>>,
    last: Mutex<ExecutionResult>,
    pub codes: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(results: Vec<ExecutionResult>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            last: Mutex::new(ExecutionResult::failed("nothing scripted")),
            codes: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.codes.lock().unwrap().len()
    }
}

#[async_trait]
impl CodeRunner for ScriptedRunner {
    async fn execute_code(&self, code: &str, _quiz_url: &str) -> ExecutionResult {
        self.codes.lock().unwrap().push(code.to_string());
        match self.results.lock().unwrap().pop_front() {
            Some(result) => {
                *self.last.lock().unwrap() = result.clone();
                result
            }
            None => self.last.lock().unwrap().clone(),
        }
    }
}

/// Fallback submitter with a fixed answer.
pub struct FakeSubmitter {
    pub response: Option<SubmissionResult>,
    pub submitted: Mutex<Vec<String>>,
}

impl FakeSubmitter {
    pub fn new(response: Option<SubmissionResult>) -> Self {
        Self {
            response,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerSubmitter for FakeSubmitter {
    async fn submit_fallback(&self, quiz_url: &str) -> Option<SubmissionResult> {
        self.submitted.lock().unwrap().push(quiz_url.to_string());
        self.response.clone()
    }
}

/// Successful run whose submission got the given verdict.
pub fn verdict(correct: Option<bool>, next_url: Option<&str>) -> ExecutionResult {
    ExecutionResult {
        success: true,
        output: "REQUEST_STATUS: 200".to_string(),
        error: None,
        traceback: None,
        submission: SubmissionResult {
            correct,
            next_url: next_url.map(str::to_string),
            reason: correct.filter(|c| !c).map(|_| "Wrong answer".to_string()),
            status_code: Some(200),
        },
    }
}

/// Successful run that printed nothing parseable.
pub fn silent_run() -> ExecutionResult {
    ExecutionResult {
        success: true,
        ..Default::default()
    }
}

pub fn crashed(error: &str) -> ExecutionResult {
    ExecutionResult {
        success: false,
        output: String::new(),
        error: Some(error.to_string()),
        traceback: Some(format!("Traceback (most recent call last):\n{}", error)),
        submission: SubmissionResult::default(),
    }
}
