//! Startup checks on a resolved configuration.
//!
//! Errors stop the service; warnings are logged and ignored.

use crate::error::ConfigError;
use crate::schema::Config;

/// One problem, keyed by its dotted config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &'static str, message: impl Into<String>) {
        self.errors.push(Finding {
            path,
            message: message.into(),
        });
    }

    fn warn(&mut self, path: &'static str, message: impl Into<String>) {
        self.warnings.push(Finding {
            path,
            message: message.into(),
        });
    }

    /// The warnings, or every error joined into [`ConfigError::Rejected`].
    pub fn into_result(self) -> Result<Vec<Finding>, ConfigError> {
        if self.is_valid() {
            return Ok(self.warnings);
        }
        let summary = self
            .errors
            .iter()
            .map(|f| format!("{}: {}", f.path, f.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::Rejected(summary))
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::check_server(config, &mut result);
        Self::check_student(config, &mut result);
        Self::check_gemini(config, &mut result);
        Self::check_budget(config, &mut result);
        Self::check_browser(config, &mut result);
        Self::check_executor(config, &mut result);
        result
    }

    fn check_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.error("server.port", "must be between 1 and 65535");
        }
        if config.server.host.trim().is_empty() {
            result.error("server.host", "is empty");
        }
        if config.server.body_limit == 0 {
            result.error("server.body_limit", "must allow at least one byte");
        }
    }

    fn check_student(config: &Config, result: &mut ValidationResult) {
        let student = &config.student;
        if student.secret.is_empty() {
            result.error("student.secret", "is not set (STUDENT_SECRET)");
        }
        match student.email.as_str() {
            "" => result.error("student.email", "is empty"),
            email if !email.contains('@') => {
                result.warn("student.email", format!("{:?} does not look like an email address", email));
            }
            _ => {}
        }
    }

    fn check_gemini(config: &Config, result: &mut ValidationResult) {
        let gemini = &config.gemini;
        if gemini.api_key.is_empty() {
            result.error("gemini.api_key", "is not set (GEMINI_API_KEY)");
        }
        if gemini.model.is_empty() {
            result.error("gemini.model", "is empty");
        }
        if !(gemini.base_url.starts_with("http://") || gemini.base_url.starts_with("https://")) {
            result.error("gemini.base_url", "needs an http:// or https:// scheme");
        }
        if !(0.0..=2.0).contains(&gemini.temperature) {
            result.warn("gemini.temperature", "the API rejects values outside 0.0..=2.0");
        }
    }

    /// The per-question clock: skipping must leave time to retry.
    fn check_budget(config: &Config, result: &mut ValidationResult) {
        let quiz = &config.quiz;
        if quiz.timeout_seconds == 0 {
            result.error("quiz.timeout_seconds", "must be greater than 0");
            return;
        }
        if quiz.skip_threshold_seconds.saturating_mul(2) >= quiz.timeout_seconds {
            result.warn(
                "quiz.skip_threshold_seconds",
                "leaves no room for retries within quiz.timeout_seconds",
            );
        }
        if quiz.fallback_answer.is_empty() {
            result.warn("quiz.fallback_answer", "is empty");
        }
    }

    fn check_browser(config: &Config, result: &mut ValidationResult) {
        let browser = &config.browser;
        if browser.timeout_ms == 0 {
            result.error("browser.timeout_ms", "must be greater than 0");
        }
        if browser.debug_port == 0 {
            result.error("browser.debug_port", "must be between 1 and 65535");
        }
        if let Some(path) = browser.chrome_path.as_deref().filter(|p| !p.exists()) {
            result.warn(
                "browser.chrome_path",
                format!("{} does not exist; rendering will fail", path.display()),
            );
        }
    }

    fn check_executor(config: &Config, result: &mut ValidationResult) {
        let executor = &config.executor;
        if executor.python.trim().is_empty() {
            result.error("executor.python", "is empty");
        }
        if executor.timeout_seconds == 0 {
            result.error("executor.timeout_seconds", "must be greater than 0");
        } else if executor.timeout_seconds > config.quiz.timeout_seconds {
            result.warn(
                "executor.timeout_seconds",
                "exceeds the per-question budget (quiz.timeout_seconds)",
            );
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
