//! Quiz page rendering with headless Chromium.
//!
//! Quiz pages build their question client-side, so a plain HTTP fetch is not
//! enough. This crate drives Chromium over the Chrome DevTools Protocol (CDP)
//! with a small pure Rust client.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐    WebSocket     ┌──────────────────┐
//! │ QuizPageRenderer │ ◄──────────────► │ headless Chromium│
//! │  BrowserManager  │       CDP        │  (launched lazily)│
//! └──────────────────┘                  └──────────────────┘
//! ```
//!
//! ## Lazy Initialization
//!
//! Chromium is not started when the service boots. The first page visit
//! launches it (or attaches to one already listening on the debug port) and
//! the process is then shared by every quiz chain, one page per visit.

pub mod cdp;
pub mod manager;
mod renderer;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use manager::{BrowserManager, BrowserManagerConfig};
pub use renderer::{QuizPageRenderer, RenderSettings};
