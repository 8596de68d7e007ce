//! BrowserManager core: struct definition, Chrome discovery, launch and connect.

use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use quizsolver_protocols::BrowserError;
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::BrowserManagerConfig;
use crate::cdp::CdpClient;

const LAUNCH_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A Chrome process we launched, with the profile it owns.
pub(super) struct ChromeProcess {
    pub(super) child: Child,
    pub(super) _profile: Option<TempDir>,
}

/// Owns the shared Chromium instance and its CDP connection.
///
/// Chrome is launched (or attached to) on first use. Each page visit gets
/// its own target via [`BrowserManager::open_page`].
pub struct BrowserManager {
    pub(super) config: BrowserManagerConfig,
    pub(super) client: RwLock<Option<Arc<CdpClient>>>,
    /// Serializes launch and connect.
    pub(super) connect_lock: Mutex<()>,
    pub(super) chrome_process: Mutex<Option<ChromeProcess>>,
    pub(super) http: reqwest::Client,
}

impl BrowserManager {
    /// Create a new browser manager. Nothing is started yet.
    pub fn new(config: BrowserManagerConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap_or_default();

        Self {
            config,
            client: RwLock::new(None),
            connect_lock: Mutex::new(()),
            chrome_process: Mutex::new(None),
            http,
        }
    }

    pub fn config(&self) -> &BrowserManagerConfig {
        &self.config
    }

    /// Check if Chrome is already listening on the debug port.
    pub(super) async fn is_chrome_running(&self) -> bool {
        let url = format!("{}/json/version", self.config.endpoint());
        match self.http.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Launch Chrome with remote debugging enabled.
    pub(super) async fn launch_chrome(&self) -> Result<ChromeProcess, BrowserError> {
        let chrome_path = self.config.chrome_binary().ok_or(BrowserError::ChromeNotFound)?;

        let (profile_dir, temp_profile) = match &self.config.profile_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                (dir.clone(), None)
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("quizsolver-chrome-")
                    .tempdir()?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        info!(
            chrome = %chrome_path.display(),
            profile = %profile_dir.display(),
            "Launching Chrome"
        );

        let child = Command::new(&chrome_path)
            .args(self.config.launch_args(&profile_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(format!("{}: {}", chrome_path.display(), e)))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(ChromeProcess {
            child,
            _profile: temp_profile,
        })
    }

    /// Wait until a freshly launched Chrome answers on the debug port.
    async fn wait_for_startup(&self, process: &mut ChromeProcess) -> Result<(), BrowserError> {
        let start = Instant::now();

        loop {
            if self.is_chrome_running().await {
                debug!("Chrome ready after {:?}", start.elapsed());
                return Ok(());
            }

            if let Ok(Some(status)) = process.child.try_wait() {
                return Err(BrowserError::LaunchFailed(format!(
                    "Chrome exited during startup with {}",
                    status
                )));
            }

            if start.elapsed() >= self.config.launch_timeout {
                return Err(BrowserError::LaunchFailed(format!(
                    "Chrome did not open port {} within {:?}",
                    self.config.debug_port, self.config.launch_timeout
                )));
            }

            tokio::time::sleep(LAUNCH_POLL_INTERVAL).await;
        }
    }

    /// Current client if its connection is still up.
    pub(super) async fn live_client(&self) -> Option<Arc<CdpClient>> {
        self.client
            .read()
            .await
            .as_ref()
            .filter(|c| c.is_alive())
            .cloned()
    }

    /// Connect to the browser, launching it if necessary.
    pub async fn connect(&self) -> Result<Arc<CdpClient>, BrowserError> {
        if let Some(client) = self.live_client().await {
            return Ok(client);
        }

        let _guard = self.connect_lock.lock().await;
        if let Some(client) = self.live_client().await {
            return Ok(client);
        }

        if self.is_chrome_running().await {
            info!("Chrome already running on port {}", self.config.debug_port);
        } else {
            info!(
                "Chrome not running on port {}, launching...",
                self.config.debug_port
            );
            let mut process = self.launch_chrome().await?;
            if let Err(e) = self.wait_for_startup(&mut process).await {
                let _ = process.child.kill().await;
                return Err(e);
            }
            *self.chrome_process.lock().await = Some(process);
        }

        let client = Arc::new(CdpClient::connect(&self.config.endpoint()).await?);
        info!(
            browser = client.browser_version(),
            "Connected to Chrome at {}",
            self.config.endpoint()
        );
        *self.client.write().await = Some(client.clone());
        Ok(client)
    }

    /// Whether a live CDP connection exists.
    pub async fn is_connected(&self) -> bool {
        self.live_client().await.is_some()
    }

    /// Drop the CDP connection. A launched Chrome keeps running.
    pub async fn close(&self) {
        if self.client.write().await.take().is_some() {
            info!("Browser connection closed");
        }
    }

    /// Close the connection and stop Chrome if we launched it.
    pub async fn shutdown_chrome(&self) {
        self.close().await;
        if let Some(mut process) = self.chrome_process.lock().await.take() {
            info!("Shutting down Chrome...");
            if let Err(e) = process.child.kill().await {
                warn!("Failed to stop Chrome: {}", e);
            }
        }
    }
}
