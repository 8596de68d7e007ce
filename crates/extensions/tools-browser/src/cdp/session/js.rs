//! Script evaluation in the page.

use serde_json::{json, Value};

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Evaluate `expression`, awaiting a returned promise, and hand back
    /// its JSON value. An uncaught exception becomes [`CdpError::Script`].
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let mut reply = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(details) = reply.get("exceptionDetails") {
            return Err(CdpError::Script(exception_message(details)));
        }
        Ok(reply
            .pointer_mut("/result/value")
            .map(Value::take)
            .unwrap_or_default())
    }

    /// Like [`evaluate`](Self::evaluate); any non-string result reads as empty.
    pub async fn evaluate_string(&self, expression: &str) -> Result<String, CdpError> {
        match self.evaluate(expression).await? {
            Value::String(text) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    /// The serialized DOM after scripts ran.
    pub async fn outer_html(&self) -> Result<String, CdpError> {
        self.evaluate_string("document.documentElement.outerHTML").await
    }
}

/// `exception.description` carries the stack; `text` is the fallback summary.
pub(super) fn exception_message(details: &Value) -> String {
    details["exception"]["description"]
        .as_str()
        .or_else(|| details["text"].as_str())
        .unwrap_or("uncaught exception")
        .to_string()
}
