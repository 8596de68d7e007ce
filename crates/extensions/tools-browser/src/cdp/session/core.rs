//! Page session state and command routing.

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::cdp::client::Commander;
use crate::cdp::error::CdpError;
use crate::cdp::protocol::CdpEvent;

/// One attached page target. Commands are tagged with the session id so
/// Chrome routes them to this page over the shared browser socket.
pub struct PageSession {
    pub(super) target_id: String,
    pub(super) session_id: String,
    commander: Commander,
    /// Events the client's receive loop routed to this session.
    pub(super) events: tokio::sync::Mutex<mpsc::UnboundedReceiver<CdpEvent>>,
    pub(super) document_status: Mutex<Option<u16>>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        commander: Commander,
        events: mpsc::UnboundedReceiver<CdpEvent>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            commander,
            events: tokio::sync::Mutex::new(events),
            document_status: Mutex::new(None),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.commander
            .send(method, params, Some(&self.session_id))
            .await
    }

    /// Page lifecycle, script evaluation and network events.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        for domain in ["Page", "Runtime", "Network"] {
            self.call(&format!("{}.enable", domain), None).await?;
        }
        debug!(session = %self.session_id, "CDP domains enabled");
        Ok(())
    }

    /// HTTP status of the last main document response seen while waiting
    /// for network idle.
    pub fn last_response_status(&self) -> Option<u16> {
        *self.document_status.lock()
    }
}
