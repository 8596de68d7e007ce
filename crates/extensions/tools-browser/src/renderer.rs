//! Quiz page rendering on top of the shared browser.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use quizsolver_protocols::{BrowserError, PageRenderer, QuestionData};
use tracing::{debug, info, warn};

use crate::cdp::{CdpError, PageSession};
use crate::manager::BrowserManager;

/// Visible text of the whole body.
const BODY_TEXT_JS: &str =
    "document.body.innerText || document.body.textContent || ''";

/// Text of the `#result` element some quiz pages render into.
const RESULT_TEXT_JS: &str = r#"(() => {
    const el = document.querySelector('#result');
    return el ? (el.innerText || el.textContent || '') : '';
})()"#;

/// Every text node under the body, one per line.
const TEXT_NODES_JS: &str = r#"(() => {
    if (!document.body) return '';
    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT, null);
    let text = '';
    let node;
    while ((node = walker.nextNode())) {
        text += node.textContent + '\n';
    }
    return text;
})()"#;

const EXTRACTION_STRATEGIES: &[(&str, &str)] = &[
    ("innerText", BODY_TEXT_JS),
    ("#result", RESULT_TEXT_JS),
    ("TreeWalker", TEXT_NODES_JS),
];

/// Page load and emulation settings.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    /// Budget for navigation plus network idle.
    pub navigation_timeout: Duration,
    /// Quiet period that counts as network idle.
    pub network_idle: Duration,
    /// Extra wait for client-side rendering once the network is idle.
    pub settle: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
            navigation_timeout: Duration::from_secs(30),
            network_idle: Duration::from_millis(500),
            settle: Duration::from_secs(2),
        }
    }
}

/// Renders quiz pages in headless Chromium and extracts the question.
pub struct QuizPageRenderer {
    manager: Arc<BrowserManager>,
    settings: RenderSettings,
    http: reqwest::Client,
}

impl QuizPageRenderer {
    pub fn new(manager: Arc<BrowserManager>, settings: RenderSettings) -> Self {
        Self {
            manager,
            settings,
            http: reqwest::Client::new(),
        }
    }

    pub fn manager(&self) -> &Arc<BrowserManager> {
        &self.manager
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    async fn render(&self, page: &PageSession, url: &str) -> Result<QuestionData, CdpError> {
        let start = Instant::now();
        let settings = &self.settings;

        page.set_viewport(settings.viewport_width, settings.viewport_height)
            .await?;
        page.set_user_agent(&settings.user_agent).await?;

        info!("Loading page...");
        page.navigate(url, settings.navigation_timeout).await?;

        let remaining = settings.navigation_timeout.saturating_sub(start.elapsed());
        if let Err(e) = page
            .wait_for_network_idle(settings.network_idle, remaining)
            .await
        {
            warn!("Network did not settle, rendering anyway: {}", e);
        }

        match page.last_response_status() {
            Some(status) => info!(status, "Page loaded"),
            None => info!("Page loaded"),
        }

        if !settings.settle.is_zero() {
            tokio::time::sleep(settings.settle).await;
        }

        let raw_html = page.outer_html().await?;
        info!("HTML content length: {} characters", raw_html.len());

        let question_text = extract_question_text(page).await;
        let preview: String = question_text.chars().take(500).collect();
        info!("Extracted question (first 500 chars):\n{}", preview);

        Ok(QuestionData {
            question_text,
            raw_html,
            url: url.to_string(),
        })
    }

    /// Fetch a file over HTTP, optionally saving it to `output`.
    pub async fn download_file(
        &self,
        url: &str,
        output: Option<&Path>,
    ) -> Result<Vec<u8>, BrowserError> {
        info!("Downloading file from: {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BrowserError::DownloadFailed(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::DownloadFailed(format!("{}: HTTP {}", url, status)));
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| BrowserError::DownloadFailed(format!("{}: {}", url, e)))?
            .to_vec();
        info!("Downloaded {} bytes", content.len());

        if let Some(path) = output {
            tokio::fs::write(path, &content).await?;
            info!("Saved to: {}", path.display());
        }

        Ok(content)
    }
}

#[async_trait]
impl PageRenderer for QuizPageRenderer {
    async fn visit_quiz_page(&self, url: &str) -> Result<QuestionData, BrowserError> {
        info!("Navigating to: {}", url);

        let page = self.manager.open_page().await?;
        let result = self.render(&page, url).await;
        self.manager.close_page(&page).await;

        result.map_err(|e| {
            warn!("Failed to visit page {}: {}", url, e);
            e.into()
        })
    }
}

/// Try each text extraction strategy in turn; empty when all come up empty.
pub(crate) async fn extract_question_text(page: &PageSession) -> String {
    for (name, script) in EXTRACTION_STRATEGIES {
        match page.evaluate(script).await {
            Ok(value) => {
                let text = value.as_str().unwrap_or_default().trim();
                if !text.is_empty() {
                    debug!("Extracted text using {}", name);
                    return text.to_string();
                }
            }
            Err(e) => debug!("Text extraction via {} failed: {}", name, e),
        }
    }

    warn!("Could not extract meaningful text, returning empty string");
    String::new()
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
