//! Failures while rendering a quiz page.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// Neither `CHROME_PATH` nor any well-known install location has a binary.
    #[error("no Chrome or Chromium executable found (set CHROME_PATH)")]
    ChromeNotFound,

    #[error("could not start Chrome: {0}")]
    LaunchFailed(String),

    #[error("DevTools connection failed: {0}")]
    ConnectionFailed(String),

    #[error("browser is not connected")]
    NotConnected,

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    /// Script evaluation, emulation or a protocol command failed on a loaded page.
    #[error("page operation failed: {0}")]
    ActionFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("browser profile: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            BrowserError::LaunchFailed("permission denied".to_string()).to_string(),
            "could not start Chrome: permission denied"
        );
        assert!(BrowserError::ChromeNotFound.to_string().contains("CHROME_PATH"));
    }

    #[test]
    fn test_profile_io_error() {
        let err = BrowserError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.to_string(), "browser profile: read-only");
    }
}
