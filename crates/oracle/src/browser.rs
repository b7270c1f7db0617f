//! Headless Chrome process management.

use crate::chrome::ChromeOracle;
use anyhow::{Context as _, Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfig};
use core::time::Duration;
use futures::StreamExt as _;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tokio::task::{JoinHandle, spawn};

/// How the browser is launched and how pages are prepared.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Chrome binary; auto-detected when unset.
    pub chrome_executable: Option<PathBuf>,
    /// Upper bound for each navigation step.
    pub navigation_timeout: Duration,
    /// Pause after expanding collapsed content, so the runtime can react.
    pub settle: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            navigation_timeout: Duration::from_secs(60),
            settle: Duration::from_millis(200),
        }
    }
}

/// Browser instance with background event handler.
pub struct ChromeBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeBrowser {
    /// Launch headless Chrome.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected or the process fails to start.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1280, 800)
            .arg("--disable-gpu")
            .arg("--allow-file-access-from-files")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--mute-audio");
        if let Some(executable) = &options.chrome_executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder
            .build()
            .map_err(|err| anyhow!("browser config error: {err}"))?;

        log::info!("launching headless Chrome");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chrome")?;

        let handler_task = spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    log::debug!("browser event error: {err}");
                }
            }
        });

        Ok(Self {
            browser,
            handler: handler_task,
        })
    }

    /// Open `path` in a fresh tab and prepare it for queries.
    ///
    /// # Errors
    ///
    /// Returns an error if the tab cannot be created or navigation fails.
    pub async fn open(&self, path: &Path, options: &BrowserOptions) -> Result<ChromeOracle> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to open a browser tab")?;
        ChromeOracle::prepare(page, path, options).await
    }

    /// Close the browser and stop its event handler.
    pub async fn close(self) {
        let Self { mut browser, handler } = self;
        if let Err(err) = browser.close().await {
            log::warn!("failed to close Chrome: {err}");
        } else if let Err(err) = browser.wait().await {
            log::debug!("waiting for Chrome to exit failed: {err}");
        }
        handler.abort();
    }
}

/// Browser shared by every document of a run, launched on first demand.
pub struct BrowserHandle {
    options: BrowserOptions,
    cell: OnceCell<ChromeBrowser>,
}

impl BrowserHandle {
    pub fn new(options: BrowserOptions) -> Self {
        Self {
            options,
            cell: OnceCell::new(),
        }
    }

    /// The browser, launching it if needed. A failed launch is retried on the next call.
    ///
    /// # Errors
    ///
    /// Returns an error if Chrome cannot be launched.
    pub async fn get(&self) -> Result<&ChromeBrowser> {
        self.cell
            .get_or_try_init(|| ChromeBrowser::launch(&self.options))
            .await
    }

    /// Open `path` in a new tab of the shared browser.
    ///
    /// # Errors
    ///
    /// Returns an error if launching, tab creation or navigation fails.
    pub async fn open_page(&self, path: &Path) -> Result<ChromeOracle> {
        self.get().await?.open(path, &self.options).await
    }

    pub fn is_launched(&self) -> bool {
        self.cell.initialized()
    }

    /// Close the browser if it was ever launched.
    pub async fn close(self) {
        if let Some(browser) = self.cell.into_inner() {
            browser.close().await;
        }
    }
}

impl Default for BrowserHandle {
    fn default() -> Self {
        Self::new(BrowserOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_is_lazy() {
        let handle = BrowserHandle::default();
        assert!(!handle.is_launched());
        handle.close().await;
    }

    #[tokio::test]
    async fn bad_executable_fails_launch() {
        let _ignore = env_logger::builder().is_test(true).try_init();
        let handle = BrowserHandle::new(BrowserOptions {
            chrome_executable: Some(PathBuf::from("/nonexistent/chrome")),
            ..BrowserOptions::default()
        });
        assert!(matches!(handle.get().await, Err(_)));
        assert!(!handle.is_launched());
    }
}
