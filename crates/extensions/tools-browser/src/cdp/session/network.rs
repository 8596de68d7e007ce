//! Network activity tracking from CDP events.

use std::collections::HashSet;

use crate::cdp::protocol::CdpEvent;

/// In-flight request bookkeeping for network-idle detection.
#[derive(Debug, Default)]
pub struct NetworkTracker {
    inflight: HashSet<String>,
    document_status: Option<u16>,
}

impl NetworkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update state from one event. Non-network events are ignored.
    pub fn observe(&mut self, event: &CdpEvent) {
        let params = &event.params;
        let request_id = event.request_id();

        match event.method.as_str() {
            "Network.requestWillBeSent" => {
                if let Some(id) = request_id {
                    self.inflight.insert(id.to_string());
                }
            }
            "Network.loadingFinished" | "Network.loadingFailed" => {
                if let Some(id) = request_id {
                    self.inflight.remove(id);
                }
            }
            "Network.responseReceived" if params["type"] == "Document" => {
                self.document_status = params["response"]["status"]
                    .as_u64()
                    .and_then(|s| u16::try_from(s).ok());
            }
            _ => {}
        }
    }

    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_idle(&self) -> bool {
        self.inflight.is_empty()
    }

    pub fn document_status(&self) -> Option<u16> {
        self.document_status
    }
}
