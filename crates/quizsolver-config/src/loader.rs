//! Configuration loader.
//!
//! Values are resolved in order: built-in defaults, the TOML file (if any),
//! then environment variables (including those from a `.env` file).

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            Some(p) if p.as_os_str() != "quizsolver.toml" => {
                Err(ConfigError::Missing(p.to_path_buf()))
            }
            _ => Ok(Config::default()),
        }
    }

    /// Full startup resolution: `.env`, file, then process environment.
    pub fn resolve(path: Option<&Path>) -> Result<Config, ConfigError> {
        Self::load_dotenv();
        let mut config = Self::load_or_default(path)?;
        Self::apply_env(&mut config)?;
        Ok(config)
    }

    /// Load a `.env` file from the working directory (or a parent) into the
    /// process environment. Existing variables win.
    pub fn load_dotenv() -> Option<PathBuf> {
        dotenv::dotenv().ok()
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_env_with(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("HOST") {
            config.server.host = v;
        }
        if let Some(v) = get("PORT") {
            config.server.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = get("STUDENT_EMAIL") {
            config.student.email = v;
        }
        if let Some(v) = get("STUDENT_SECRET") {
            config.student.secret = v;
        }
        if let Some(v) = get("GEMINI_API_KEY") {
            config.gemini.api_key = v;
        }
        if let Some(v) = get("GEMINI_MODEL") {
            config.gemini.model = v;
        }
        if let Some(v) = get("GEMINI_BASE_URL") {
            config.gemini.base_url = v;
        }
        if let Some(v) = get("QUIZ_TIMEOUT_SECONDS") {
            config.quiz.timeout_seconds = parse_var("QUIZ_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = get("SKIP_THRESHOLD_SECONDS") {
            config.quiz.skip_threshold_seconds = parse_var("SKIP_THRESHOLD_SECONDS", &v)?;
        }
        if let Some(v) = get("MAX_RETRIES_PER_QUESTION") {
            config.quiz.max_retries_per_question = parse_var("MAX_RETRIES_PER_QUESTION", &v)?;
        }
        if let Some(v) = get("BROWSER_HEADLESS") {
            config.browser.headless = parse_bool("BROWSER_HEADLESS", &v)?;
        }
        if let Some(v) = get("BROWSER_TIMEOUT") {
            config.browser.timeout_ms = parse_var("BROWSER_TIMEOUT", &v)?;
        }
        if let Some(v) = get("BROWSER_DEBUG_PORT") {
            config.browser.debug_port = parse_var("BROWSER_DEBUG_PORT", &v)?;
        }
        if let Some(v) = get("CHROME_PATH") {
            config.browser.chrome_path = Some(PathBuf::from(Self::expand_path(&v)));
        }
        if let Some(v) = get("PYTHON_BIN") {
            config.executor.python = v;
        }
        if let Some(v) = get("EXECUTOR_TIMEOUT_SECONDS") {
            config.executor.timeout_seconds = parse_var("EXECUTOR_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            config.logging.level = v.to_lowercase();
        }
        if let Some(v) = get("LOG_DIR") {
            config.logging.dir = PathBuf::from(Self::expand_path(&v));
        }

        Ok(())
    }

    /// Substitute `${NAME}` placeholders from the process environment.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut expanded = String::with_capacity(content.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = std::env::var(name.as_str())
                .map_err(|_| ConfigError::UnsetVariable(name.as_str().to_string()))?;
            expanded.push_str(&content[last..whole.start()]);
            expanded.push_str(&value);
            last = whole.end();
        }

        expanded.push_str(&content[last..]);
        Ok(expanded)
    }

    /// Expand shell-style paths (e.g., `~/logs`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

fn parse_var<T>(field: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::BadVariable {
        var: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "y" | "t" => Ok(true),
        "0" | "false" | "no" | "off" | "n" | "f" => Ok(false),
        _ => Err(ConfigError::BadVariable {
            var: field.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
