//! Runtime configuration types (quiz budget, browser, executor, logging).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::default_true;

/// Time budget and retry policy per quiz question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Budget for a single question, in seconds.
    #[serde(default = "default_quiz_timeout")]
    pub timeout_seconds: u64,

    /// A retry needs more than twice this much time left.
    #[serde(default = "default_skip_threshold")]
    pub skip_threshold_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries_per_question: u32,

    /// Answer posted when no solution could be produced.
    #[serde(default = "default_fallback_answer")]
    pub fallback_answer: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_quiz_timeout(),
            skip_threshold_seconds: default_skip_threshold(),
            max_retries_per_question: default_max_retries(),
            fallback_answer: default_fallback_answer(),
        }
    }
}

fn default_quiz_timeout() -> u64 {
    180
}

fn default_skip_threshold() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    1
}

fn default_fallback_answer() -> String {
    "FAILED".to_string()
}

/// Headless browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Navigation timeout in milliseconds.
    #[serde(default = "default_browser_timeout")]
    pub timeout_ms: u64,

    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra wait after the network settles, for client-side rendering.
    #[serde(default = "default_settle_ms")]
    pub render_settle_ms: u64,

    /// Explicit Chrome/Chromium binary; auto-detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_true(),
            timeout_ms: default_browser_timeout(),
            debug_port: default_debug_port(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            user_agent: default_user_agent(),
            render_settle_ms: default_settle_ms(),
            chrome_path: None,
        }
    }
}

fn default_browser_timeout() -> u64 {
    30_000
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_settle_ms() -> u64 {
    2000
}

/// Python executor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Interpreter binary.
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_executor_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            python: default_python(),
            timeout_seconds: default_executor_timeout(),
        }
    }
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_executor_timeout() -> u64 {
    120
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files, created at startup.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}
