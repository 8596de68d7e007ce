//! CDP page session for interacting with a single page.

mod core;
mod emulation;
mod js;
mod navigation;
mod network;

pub use self::core::PageSession;
pub use self::network::NetworkTracker;
