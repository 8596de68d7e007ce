//! Chromium launch settings and executable discovery.

use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(target_os = "linux")]
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/snap/bin/chromium",
];

#[cfg(target_os = "macos")]
const CHROME_CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "windows")]
const CHROME_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const CHROME_CANDIDATES: &[&str] = &[];

/// Flags every launch gets. Quiet, no first-run UI, and `/dev/shm` avoided
/// because containers usually give it 64 MB.
const BASE_FLAGS: &[&str] = &[
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-background-networking",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-sync",
    "--disable-translate",
    "--mute-audio",
];

#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Remote debugging port; an already listening Chrome is reused.
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub headless: bool,
    /// Searched for on the usual install paths when unset.
    pub chrome_path: Option<PathBuf>,
    /// A temporary profile is created per launch when unset.
    pub profile_dir: Option<PathBuf>,
    /// How long a launched Chrome may take to open its debug port.
    pub launch_timeout: Duration,
    /// Needed when running as root inside a container.
    pub no_sandbox: bool,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            viewport_width: 1920,
            viewport_height: 1080,
            headless: true,
            chrome_path: None,
            profile_dir: None,
            launch_timeout: Duration::from_secs(15),
            no_sandbox: true,
        }
    }
}

impl BrowserManagerConfig {
    /// DevTools HTTP endpoint on loopback.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }

    /// The executable to launch. An explicit path is taken as given: if it
    /// does not exist there is no fallback search.
    pub fn chrome_binary(&self) -> Option<PathBuf> {
        find_chrome(self.chrome_path.as_deref(), CHROME_CANDIDATES)
    }

    /// Command line for a Chrome using `profile_dir`, opening a blank page.
    pub fn launch_args(&self, profile_dir: &Path) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            format!("--user-data-dir={}", profile_dir.display()),
            format!("--window-size={},{}", self.viewport_width, self.viewport_height),
        ];
        args.extend(BASE_FLAGS.iter().map(|f| f.to_string()));
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if self.no_sandbox {
            args.push("--no-sandbox".to_string());
        }
        args.push("about:blank".to_string());
        args
    }
}

pub(crate) fn find_chrome(explicit: Option<&Path>, candidates: &[&str]) -> Option<PathBuf> {
    match explicit {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => candidates.iter().map(PathBuf::from).find(|p| p.exists()),
    }
}
