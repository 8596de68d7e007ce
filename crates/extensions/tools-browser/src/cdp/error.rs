//! DevTools connection errors.

use thiserror::Error;

use quizsolver_protocols::BrowserError;

#[derive(Debug, Error)]
pub enum CdpError {
    /// Nothing answered `GET /json/version` on the debug endpoint.
    #[error("no DevTools endpoint at {0}")]
    EndpointUnavailable(String),

    #[error("DevTools handshake failed: {0}")]
    Handshake(String),

    #[error("DevTools socket: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Chrome answered a command with an `error` object.
    #[error("Chrome rejected command: {message} ({code})")]
    Rejected { code: i64, message: String },

    #[error("malformed DevTools frame: {0}")]
    Frame(#[from] serde_json::Error),

    #[error("DevTools HTTP: {0}")]
    Discovery(#[from] reqwest::Error),

    #[error("bad DevTools URL: {0}")]
    BadUrl(#[from] url::ParseError),

    #[error("navigation failed: {0}")]
    Navigation(String),

    /// An uncaught exception from `Runtime.evaluate`.
    #[error("script threw: {0}")]
    Script(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("DevTools session closed")]
    Closed,

    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
}

impl CdpError {
    /// The socket is gone; a new connection is needed.
    pub fn connection_lost(&self) -> bool {
        matches!(self, CdpError::Socket(_) | CdpError::Closed)
    }
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::EndpointUnavailable(_) | CdpError::Handshake(_) | CdpError::BadUrl(_) => {
                BrowserError::ConnectionFailed(e.to_string())
            }
            CdpError::Navigation(msg) => BrowserError::NavigationFailed(msg),
            CdpError::Closed => BrowserError::NotConnected,
            other => BrowserError::ActionFailed(other.to_string()),
        }
    }
}
