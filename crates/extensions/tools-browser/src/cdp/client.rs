//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};
use url::Url;

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpCommand, CdpEvent, CdpFrame, Incoming, TargetInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type ReplySender = oneshot::Sender<Result<Value, CdpError>>;
type PendingMap = Arc<Mutex<HashMap<u64, ReplySender>>>;
type EventHandlers = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<CdpEvent>>>>;

/// Upper bound for a single CDP command round trip.
pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Write half of the DevTools socket and the replies still owed on it.
/// Shared by the client and every page session.
#[derive(Clone)]
pub(crate) struct Commander {
    sink: Arc<tokio::sync::Mutex<WsSink>>,
    pending: PendingMap,
    next_id: Arc<AtomicU64>,
}

impl Commander {
    fn new(sink: WsSink, pending: PendingMap) -> Self {
        Self {
            sink: Arc::new(tokio::sync::Mutex::new(sink)),
            pending,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Send one command, scoped to `session_id` if given, and wait for its reply.
    pub(crate) async fn send(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let text = serde_json::to_string(&CdpCommand {
            id,
            method,
            params: params.as_ref(),
            session_id,
        })?;
        trace!("CDP send: {}", text);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let sent = self.sink.lock().await.send(Message::Text(text.into())).await;
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(CdpError::Closed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("no reply to {} within {:?}", method, COMMAND_TIMEOUT)))
            }
        }
    }
}

/// Chrome reports its socket address as seen from its own host. Keep the
/// path and port but use the host the HTTP endpoint was reached on.
pub(crate) fn socket_url(endpoint: &str, reported: &str) -> Result<String, CdpError> {
    let endpoint = Url::parse(endpoint)?;
    let mut socket = Url::parse(reported)?;
    socket.set_host(endpoint.host_str())?;
    Ok(socket.into())
}

/// CDP client for browser automation.
///
/// Connects to Chrome via WebSocket and multiplexes page sessions over it.
pub struct CdpClient {
    /// HTTP endpoint for page discovery.
    http_endpoint: String,
    browser_ws_url: String,
    browser_version: String,
    commander: Commander,
    /// Event senders by session ID.
    event_handlers: EventHandlers,
    http: reqwest::Client,
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = http
            .get(&version_url)
            .send()
            .await
            .map_err(|e| CdpError::EndpointUnavailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::EndpointUnavailable(format!("{}: {}", endpoint, e)))?;

        let browser_ws_url = socket_url(&http_endpoint, &version.web_socket_debugger_url)?;

        let (ws_stream, _) = tokio_tungstenite::connect_async(browser_ws_url.as_str())
            .await
            .map_err(|e| CdpError::Handshake(format!("{}: {}", browser_ws_url, e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let event_handlers: EventHandlers = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            let event_handlers = event_handlers.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending, event_handlers).await;
            })
        };

        debug!(browser = %version.browser, "CDP client connected to {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            browser_version: version.browser,
            commander: Commander::new(ws_sink, pending),
            event_handlers,
            http,
            _recv_task: recv_task,
        })
    }

    /// WebSocket receive loop.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap, event_handlers: EventHandlers) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpFrame>(&text) {
                        Ok(frame) => Self::dispatch(frame, &pending, &event_handlers).await,
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Fail everything still waiting so callers do not hang until timeout.
        for (_, tx) in pending.lock().drain() {
            let _ = tx.send(Err(CdpError::Closed));
        }
        event_handlers.write().await.clear();
    }

    async fn dispatch(frame: CdpFrame, pending: &PendingMap, event_handlers: &EventHandlers) {
        match frame.classify() {
            Some(Incoming::Reply { id, result }) => {
                let waiting = pending.lock().remove(&id);
                match waiting {
                    Some(tx) => {
                        let _ = tx.send(result);
                    }
                    None => trace!("Reply {} has no waiter", id),
                }
            }
            Some(Incoming::Event(event)) => {
                let session_id = event.session_id.clone().unwrap_or_default();
                if let Some(tx) = event_handlers.read().await.get(&session_id) {
                    let _ = tx.send(event);
                }
            }
            None => {}
        }
    }

    /// Send a browser-level CDP command and wait for response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.commander.send(method, params, None).await
    }

    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    /// Product string reported by `/json/version`.
    pub fn browser_version(&self) -> &str {
        &self.browser_version
    }

    /// Whether the receive loop is still running.
    pub fn is_alive(&self) -> bool {
        !self._recv_task.is_finished()
    }

    /// Create a new blank page and attach a session to it.
    pub async fn new_page(&self, url: Option<&str>) -> Result<PageSession, CdpError> {
        // Chrome requires PUT for /json/new
        let create_url = match url {
            Some(u) => format!("{}/json/new?{}", self.http_endpoint, u),
            None => format!("{}/json/new", self.http_endpoint),
        };

        let target: TargetInfo = self.http.put(&create_url).send().await?.json().await?;
        debug!("Created new {}: {} - {}", target.kind, target.id, target.url);

        self.attach_page(&target.id).await
    }

    /// Attach to an existing page.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::UnexpectedReply("Missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_handlers
            .write()
            .await
            .insert(session_id.clone(), event_tx);

        let session = PageSession::new(
            target_id.to_string(),
            session_id,
            self.commander.clone(),
            event_rx,
        );

        session.enable_domains().await?;

        Ok(session)
    }

    /// Close a page and stop routing its events.
    pub async fn close_page(&self, session: &PageSession) -> Result<(), CdpError> {
        self.event_handlers
            .write()
            .await
            .remove(session.session_id());
        self.call(
            "Target.closeTarget",
            Some(json!({"targetId": session.target_id()})),
        )
        .await?;
        Ok(())
    }

    /// Number of sessions currently receiving events.
    pub async fn session_count(&self) -> usize {
        self.event_handlers.read().await.len()
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
