//! BrowserManager page operations.

use quizsolver_protocols::BrowserError;
use tracing::{debug, warn};

use super::BrowserManager;
use crate::cdp::PageSession;

impl BrowserManager {
    /// Open a fresh blank page.
    ///
    /// A dropped connection is re-established once before giving up.
    pub async fn open_page(&self) -> Result<PageSession, BrowserError> {
        let client = self.connect().await?;

        match client.new_page(None).await {
            Ok(page) => Ok(page),
            Err(e) if e.connection_lost() => {
                warn!("CDP connection lost ({}), reconnecting", e);
                self.close().await;
                let client = self.connect().await?;
                Ok(client.new_page(None).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Close a page. Failures are logged, never returned.
    pub async fn close_page(&self, page: &PageSession) {
        let Some(client) = self.live_client().await else {
            return;
        };
        if let Err(e) = client.close_page(page).await {
            debug!("Failed to close page {}: {}", page.target_id(), e);
        }
    }
}
