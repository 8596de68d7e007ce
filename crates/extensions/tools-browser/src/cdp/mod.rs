//! Chrome DevTools Protocol (CDP) client implementation.
//!
//! Connects to Chromium via WebSocket and speaks the CDP JSON-RPC protocol.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let page = client.new_page(None).await?;
//! page.navigate("https://example.com", Duration::from_secs(30)).await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::{NetworkTracker, PageSession};
