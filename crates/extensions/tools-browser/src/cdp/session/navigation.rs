//! Navigation and load waiting.

use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;
use super::network::NetworkTracker;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Set on the outgoing document so its `readyState` is not mistaken for
/// the new one. A cross-document navigation gets a fresh `window`.
const MARK_OUTGOING: &str = "window.__quizsolverOutgoing = true";
const CLEAR_OUTGOING: &str = "delete window.__quizsolverOutgoing";
const READY_STATE: &str = "window.__quizsolverOutgoing ? 'outgoing' : document.readyState";

pub(super) fn is_loaded(state: &str) -> bool {
    matches!(state, "complete" | "interactive")
}

impl PageSession {
    /// Navigate to URL and wait for the document to load.
    ///
    /// Returns the frame id.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<String, CdpError> {
        let start = Instant::now();
        self.drain_events().await;
        *self.document_status.lock() = None;
        self.evaluate(MARK_OUTGOING).await?;

        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(|e| e.as_str()) {
            return Err(CdpError::Navigation(format!("{}: {}", url, error)));
        }

        let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();
        // No loaderId: same-document navigation, the marked window stays.
        if result.get("loaderId").is_none() {
            self.evaluate(CLEAR_OUTGOING).await?;
        }

        self.wait_for_load(timeout.saturating_sub(start.elapsed()))
            .await?;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Poll `document.readyState` until the new document is interactive.
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<(), CdpError> {
        let start = Instant::now();

        loop {
            let state = self.evaluate_string(READY_STATE).await?;
            if is_loaded(&state) {
                return Ok(());
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout(format!("document not ready after {:?}", timeout)));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait until no request has been in flight for `idle`.
    ///
    /// Consumes the session's network events. Also records the status of
    /// the main document response for [`PageSession::last_response_status`].
    pub async fn wait_for_network_idle(
        &self,
        idle: Duration,
        timeout: Duration,
    ) -> Result<(), CdpError> {
        let deadline = Instant::now() + timeout;
        let mut tracker = NetworkTracker::new();
        let mut events = self.events.lock().await;

        loop {
            let now = Instant::now();
            if now >= deadline {
                self.record_status(&tracker);
                return Err(CdpError::Timeout(format!(
                    "Network not idle, {} request(s) in flight",
                    tracker.inflight()
                )));
            }

            let remaining = deadline - now;
            let wait = if tracker.is_idle() {
                idle.min(remaining)
            } else {
                remaining
            };

            match tokio::time::timeout(wait, events.recv()).await {
                Ok(Some(event)) => tracker.observe(&event),
                Ok(None) => return Err(CdpError::Closed),
                Err(_) if tracker.is_idle() => {
                    self.record_status(&tracker);
                    return Ok(());
                }
                Err(_) => {}
            }
        }
    }

    fn record_status(&self, tracker: &NetworkTracker) {
        if let Some(status) = tracker.document_status() {
            *self.document_status.lock() = Some(status);
        }
    }

    /// Discard buffered events from earlier activity.
    async fn drain_events(&self) {
        let mut events = self.events.lock().await;
        while events.try_recv().is_ok() {}
    }
}
