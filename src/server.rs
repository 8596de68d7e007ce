//! Logging setup and service wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use quizsolver_api::{ApiServer, AppState};
use quizsolver_config::{BrowserConfig, Config, LoggingConfig};
use quizsolver_protocols::LLMProvider;
use quizsolver_provider_gemini::GeminiProvider;
use quizsolver_runtime::{
    HttpAnswerSubmitter, LlmSolver, QuizHandler, QuizSettings, RetryConfig, RetryProvider,
    SolverSettings,
};
use quizsolver_tools_browser::{BrowserManager, BrowserManagerConfig, QuizPageRenderer, RenderSettings};
use quizsolver_tools_python::{PythonExecutor, PythonExecutorConfig};

/// Log file name for a process started at `now`.
pub(crate) fn log_file_name(now: DateTime<Local>) -> String {
    format!("quiz_solver_{}.log", now.format("%Y%m%d_%H%M%S"))
}

/// Initialize tracing with console output and one log file per process.
///
/// Returns the path of the log file.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&logging.dir)?;

    let file_name = log_file_name(Local::now());
    let file_appender = tracing_appender::rolling::never(&logging.dir, &file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    Ok(logging.dir.join(file_name))
}

pub(crate) fn browser_manager_config(browser: &BrowserConfig) -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: browser.debug_port,
        viewport_width: browser.viewport_width,
        viewport_height: browser.viewport_height,
        headless: browser.headless,
        chrome_path: browser.chrome_path.clone(),
        ..Default::default()
    }
}

pub(crate) fn render_settings(browser: &BrowserConfig) -> RenderSettings {
    RenderSettings {
        viewport_width: browser.viewport_width,
        viewport_height: browser.viewport_height,
        user_agent: browser.user_agent.clone(),
        navigation_timeout: Duration::from_millis(browser.timeout_ms),
        settle: Duration::from_millis(browser.render_settle_ms),
        ..Default::default()
    }
}

pub(crate) fn executor_config(config: &Config) -> PythonExecutorConfig {
    PythonExecutorConfig {
        python: config.executor.python.clone(),
        timeout: Duration::from_secs(config.executor.timeout_seconds),
        student_email: config.student.email.clone(),
        student_secret: config.student.secret.clone(),
    }
}

/// Everything the API needs, plus the browser so it can be shut down.
pub(crate) struct Services {
    pub state: Arc<AppState>,
    pub browser: Arc<BrowserManager>,
}

/// Wire the quiz handler from configuration. Nothing is started here;
/// Chromium launches on the first page visit.
pub(crate) fn build_services(config: Config) -> Result<Services, Box<dyn std::error::Error>> {
    let gemini =
        GeminiProvider::with_url(config.gemini.api_key.clone(), config.gemini.base_url.clone())?;
    let provider: Arc<dyn LLMProvider> =
        Arc::new(RetryProvider::new(Arc::new(gemini), RetryConfig::default()));
    let solver = Arc::new(LlmSolver::new(provider, SolverSettings::from_config(&config)));

    let browser = Arc::new(BrowserManager::new(browser_manager_config(&config.browser)));
    let renderer = Arc::new(QuizPageRenderer::new(
        browser.clone(),
        render_settings(&config.browser),
    ));

    let executor = Arc::new(PythonExecutor::new(executor_config(&config)));
    let submitter = Arc::new(HttpAnswerSubmitter::new(
        config.student.email.clone(),
        config.student.secret.clone(),
        config.quiz.fallback_answer.clone(),
    )?);

    let handler = Arc::new(QuizHandler::new(
        renderer,
        solver,
        executor,
        submitter,
        QuizSettings::from(&config.quiz),
    ));

    Ok(Services {
        state: Arc::new(AppState::new(Arc::new(config), handler)),
        browser,
    })
}

/// Run the API server in foreground until a shutdown signal.
pub(crate) async fn run_server(
    config: Config,
    log_file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Quiz Solver v{}", env!("CARGO_PKG_VERSION"));
    info!(email = %config.student.email, "Student");
    info!(model = %config.gemini.model, "Gemini model");
    info!(path = %log_file.display(), "Logging to file");

    let server_config = config.server.clone();
    let services = build_services(config)?;
    let server = ApiServer::new(server_config, services.state.clone());

    let result = server.run().await;

    info!("Shutting down browser");
    services.browser.shutdown_chrome().await;
    result
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
