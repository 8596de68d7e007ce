//! In-process stand-in for a Chromium remote debugging endpoint.
//!
//! Serves `/json/version` and `/json/new` over HTTP (wiremock) and answers
//! CDP commands on a local WebSocket. After `Page.navigate` it emits the
//! network events a single document load produces.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// What the fake page reports back.
#[derive(Debug, Clone)]
pub(crate) struct FakePage {
    pub html: String,
    pub body_text: String,
    pub result_text: String,
    pub walker_text: String,
    pub body_text_throws: bool,
    pub status: u16,
    pub navigate_error: Option<String>,
    /// Leave one subresource request unfinished.
    pub hang_request: bool,
    /// Load-state polls after `Page.navigate` that still see the old document.
    pub outgoing_polls: u32,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            html: "<html><body><p>Q1</p></body></html>".to_string(),
            body_text: "Q1".to_string(),
            result_text: String::new(),
            walker_text: String::new(),
            body_text_throws: false,
            status: 200,
            navigate_error: None,
            hang_request: false,
            outgoing_polls: 0,
        }
    }
}

type CommandLog = Arc<Mutex<Vec<(String, Value)>>>;

pub(crate) struct FakeChrome {
    http: MockServer,
    commands: CommandLog,
    _ws_task: JoinHandle<()>,
}

impl FakeChrome {
    pub async fn start() -> Self {
        Self::start_with(FakePage::default()).await
    }

    pub async fn start_with(page: FakePage) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_addr: SocketAddr = listener.local_addr().unwrap();
        let commands: CommandLog = Arc::new(Mutex::new(Vec::new()));
        let page = Arc::new(page);

        let ws_task = {
            let commands = commands.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, page.clone(), commands.clone()));
                }
            })
        };

        let http = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Browser": "Chrome/126.0.0.0",
                "Protocol-Version": "1.3",
                "User-Agent": "Mozilla/5.0 HeadlessChrome/126.0.0.0",
                "webSocketDebuggerUrl": format!("ws://{}/devtools/browser/fake", ws_addr),
            })))
            .mount(&http)
            .await;
        Mock::given(method("PUT"))
            .and(path("/json/new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "T1",
                "type": "page",
                "url": "about:blank",
            })))
            .mount(&http)
            .await;

        Self {
            http,
            commands,
            _ws_task: ws_task,
        }
    }

    pub fn endpoint(&self) -> String {
        self.http.uri()
    }

    pub fn port(&self) -> u16 {
        self.http.address().port()
    }

    /// Methods received so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.commands.lock().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Every `Runtime.evaluate` expression, in order.
    pub fn expressions(&self) -> Vec<String> {
        self.commands
            .lock()
            .iter()
            .filter(|(m, _)| m == "Runtime.evaluate")
            .filter_map(|(_, p)| p["expression"].as_str().map(str::to_string))
            .collect()
    }

    /// Parameters of the first command with the given method.
    pub fn params_of(&self, name: &str) -> Option<Value> {
        self.commands
            .lock()
            .iter()
            .find(|(m, _)| m == name)
            .map(|(_, p)| p.clone())
    }
}

impl Drop for FakeChrome {
    fn drop(&mut self) {
        self._ws_task.abort();
    }
}

async fn serve(stream: TcpStream, page: Arc<FakePage>, commands: CommandLog) {
    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };
    let (mut tx, mut rx) = ws.split();
    let mut outgoing = 0;

    while let Some(Ok(msg)) = rx.next().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let Ok(request) = serde_json::from_str::<Value>(&text) else {
            continue;
        };

        let name = request["method"].as_str().unwrap_or_default().to_string();
        let params = request["params"].clone();
        commands.lock().push((name.clone(), params.clone()));

        let polls_load_state = name == "Runtime.evaluate"
            && params["expression"]
                .as_str()
                .is_some_and(|e| e.contains("readyState"));
        let result = if polls_load_state && outgoing > 0 {
            outgoing -= 1;
            json!({ "result": { "type": "string", "value": "outgoing" } })
        } else {
            respond(&page, &name, &params)
        };
        let mut reply = json!({ "id": request["id"].clone(), "result": result });
        if let Some(session) = request.get("sessionId") {
            reply["sessionId"] = session.clone();
        }
        if tx.send(Message::Text(reply.to_string().into())).await.is_err() {
            break;
        }

        if name == "Page.navigate" && page.navigate_error.is_none() {
            outgoing = page.outgoing_polls;
            let session = request["sessionId"].clone();
            for event in load_events(&page) {
                let mut event = event;
                event["sessionId"] = session.clone();
                if tx.send(Message::Text(event.to_string().into())).await.is_err() {
                    return;
                }
            }
        }
    }
}

fn respond(page: &FakePage, name: &str, params: &Value) -> Value {
    match name {
        "Target.attachToTarget" => json!({ "sessionId": "S1" }),
        "Page.navigate" => match &page.navigate_error {
            Some(error) => json!({ "frameId": "F1", "errorText": error }),
            None => json!({ "frameId": "F1", "loaderId": "L1" }),
        },
        "Runtime.evaluate" => evaluate(page, params["expression"].as_str().unwrap_or_default()),
        _ => json!({}),
    }
}

fn evaluate(page: &FakePage, expression: &str) -> Value {
    let string = |s: &str| json!({ "result": { "type": "string", "value": s } });

    if expression.contains("readyState") {
        string("complete")
    } else if expression.contains("outerHTML") {
        string(&page.html)
    } else if expression.contains("TreeWalker") {
        string(&page.walker_text)
    } else if expression.contains("#result") {
        string(&page.result_text)
    } else if expression.contains("document.body.innerText") {
        if page.body_text_throws {
            json!({
                "result": { "type": "object", "subtype": "error" },
                "exceptionDetails": {
                    "text": "Uncaught",
                    "exception": { "description": "TypeError: Cannot read properties of null" },
                },
            })
        } else {
            string(&page.body_text)
        }
    } else {
        json!({ "result": { "type": "undefined" } })
    }
}

fn load_events(page: &FakePage) -> Vec<Value> {
    let mut events = vec![
        json!({
            "method": "Network.requestWillBeSent",
            "params": { "requestId": "R1", "type": "Document" },
        }),
        json!({
            "method": "Network.responseReceived",
            "params": { "requestId": "R1", "type": "Document", "response": { "status": page.status } },
        }),
        json!({
            "method": "Network.loadingFinished",
            "params": { "requestId": "R1" },
        }),
    ];
    if page.hang_request {
        events.push(json!({
            "method": "Network.requestWillBeSent",
            "params": { "requestId": "R2", "type": "XHR" },
        }));
    }
    events
}
