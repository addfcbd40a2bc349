//! Headless Chromium sessions via chromiumoxide.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use placegrab_core::AppConfig;
use tokio::task::JoinHandle;

use super::browser::{BrowserLauncher, BrowserSession};
use crate::error::StrategyError;

const IMAGE_SOURCES_JS: &str = r"
Array.from(document.querySelectorAll('img')).map((img) => {
  const primary = (img.getAttribute('src') || '').trim();
  if (primary) return img.src;
  return (img.getAttribute('data-src') || '').trim();
})
";

const SCROLL_JS: &str = "window.scrollTo(0, document.body.scrollHeight); true";

/// How long to wait for the Chromium process to exit after close or kill.
const EXIT_WAIT: Duration = Duration::from_secs(3);

/// Find a Chromium binary: the configured path if it exists, otherwise the
/// usual executable names on `PATH`.
#[must_use]
pub fn find_chromium(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), "configured Chromium path does not exist");
    }

    ["google-chrome", "chromium", "chromium-browser"]
        .into_iter()
        .find_map(|name| which::which(name).ok())
}

fn browser_err(context: &str, e: impl std::fmt::Display) -> StrategyError {
    StrategyError::Browser(format!("{context}: {e}"))
}

/// Launches one headless Chromium process per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    chromium_path: Option<PathBuf>,
    user_agent: String,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(chromium_path: Option<PathBuf>, user_agent: impl Into<String>) -> Self {
        Self {
            chromium_path,
            user_agent: user_agent.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.chromium_path.clone(), config.user_agent.clone())
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, StrategyError> {
        let chrome_path = find_chromium(self.chromium_path.as_deref())
            .ok_or_else(|| StrategyError::Browser("Chromium executable not found".to_owned()))?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--user-agent={}", self.user_agent))
            .build()
            .map_err(|e| browser_err("invalid browser config", e))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| browser_err("failed to launch Chromium", e))?;

        // Individual handler errors (e.g. CDP messages this version cannot
        // decode) are not fatal; the stream must keep being polled.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                // The process is already running; do not leave it behind.
                let _ = shutdown(&mut browser).await;
                handler_task.abort();
                return Err(browser_err("failed to open page", e));
            }
        };

        tracing::debug!("Chromium session started");
        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&mut self, url: &str) -> Result<(), StrategyError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| browser_err("navigation failed", e))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| browser_err("page load failed", e))?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), StrategyError> {
        self.page
            .evaluate(SCROLL_JS)
            .await
            .map_err(|e| browser_err("scroll failed", e))?;
        Ok(())
    }

    async fn image_sources(&mut self) -> Result<Vec<String>, StrategyError> {
        let result = self
            .page
            .evaluate(IMAGE_SOURCES_JS)
            .await
            .map_err(|e| browser_err("image query failed", e))?;
        result
            .into_value::<Vec<String>>()
            .map_err(|e| browser_err("unexpected image query result", e))
    }

    async fn close(self: Box<Self>) -> Result<(), StrategyError> {
        let mut session = *self;
        let closed = shutdown(&mut session.browser).await;
        session.handler_task.abort();
        tracing::debug!("Chromium session closed");
        closed
    }
}

/// Asks Chromium to exit over CDP, killing the process if that fails or the
/// process does not exit within [`EXIT_WAIT`].
async fn shutdown(browser: &mut Browser) -> Result<(), StrategyError> {
    let closed = browser
        .close()
        .await
        .map(|_| ())
        .map_err(|e| browser_err("failed to close Chromium", e));

    let exited = closed.is_ok()
        && matches!(tokio::time::timeout(EXIT_WAIT, browser.wait()).await, Ok(Ok(_)));
    if !exited {
        tracing::warn!("Chromium did not exit cleanly; killing the process");
        if let Some(Err(e)) = browser.kill().await {
            tracing::warn!(error = %e, "failed to kill Chromium");
        }
        let _ = tokio::time::timeout(EXIT_WAIT, browser.wait()).await;
    }
    closed
}
