//! CDP wire frames and the DevTools HTTP discovery payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::CdpError;

/// Outgoing command frame.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpCommand<'a> {
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
}

/// Any frame Chrome sends back: a command reply or an event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpFrame {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<WireError>,
    method: Option<String>,
    #[serde(default)]
    params: Value,
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    code: i64,
    message: String,
}

/// A classified incoming frame.
#[derive(Debug)]
pub enum Incoming {
    Reply {
        id: u64,
        result: Result<Value, CdpError>,
    },
    Event(CdpEvent),
}

impl CdpFrame {
    /// Split into a reply or an event. Frames with neither an id nor a
    /// method carry nothing usable.
    pub fn classify(self) -> Option<Incoming> {
        if let Some(id) = self.id {
            let result = match self.error {
                Some(e) => Err(CdpError::Rejected {
                    code: e.code,
                    message: e.message,
                }),
                None => Ok(self.result.unwrap_or(Value::Null)),
            };
            return Some(Incoming::Reply { id, result });
        }

        self.method.map(|method| {
            Incoming::Event(CdpEvent {
                method,
                params: self.params,
                session_id: self.session_id,
            })
        })
    }
}

/// Event pushed by Chrome, optionally scoped to a page session.
#[derive(Debug, Clone)]
pub struct CdpEvent {
    pub method: String,
    pub params: Value,
    pub session_id: Option<String>,
}

impl CdpEvent {
    /// `params.requestId`, present on every `Network.*` event.
    pub fn request_id(&self) -> Option<&str> {
        self.params["requestId"].as_str()
    }
}

/// Target created through `PUT /json/new`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
}

/// `GET /json/version`. Chrome mixes PascalCase and camelCase here.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserVersion {
    #[serde(rename = "Browser")]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
