//! Browser instance manager.
//!
//! Launches Chromium with remote debugging (or attaches to one already
//! listening) and hands out page sessions over a shared CDP connection.

mod config;
mod manager_core;
mod manager_pages;

pub use config::BrowserManagerConfig;
pub use manager_core::BrowserManager;

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
