//! Browser abstraction for the rendered-DOM strategy.
//!
//! A [`BrowserLauncher`] hands out one exclusively owned [`BrowserSession`]
//! per strategy run. Sessions are released with an explicit
//! [`BrowserSession::close`] call; the strategy makes that call on every exit
//! path, timeouts included.

use async_trait::async_trait;

use crate::error::StrategyError;

/// Starts isolated browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Start a fresh session. Failure here is a soft failure of the
    /// rendered-DOM strategy only.
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, StrategyError>;
}

/// One headless page, owned by a single strategy invocation.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate and wait for the initial DOM content.
    async fn goto(&mut self, url: &str) -> Result<(), StrategyError>;
    /// Scroll to the bottom once to trigger lazy loading.
    async fn scroll_to_bottom(&mut self) -> Result<(), StrategyError>;
    /// Resolved `src` of every `<img>`, falling back to `data-src` when the
    /// primary attribute is empty. Order follows the document.
    async fn image_sources(&mut self) -> Result<Vec<String>, StrategyError>;
    /// Tear the session down, terminating any browser process it owns.
    async fn close(self: Box<Self>) -> Result<(), StrategyError>;
}

/// Launcher used when browser automation is disabled or unavailable.
/// Every launch fails, so the rendered-DOM strategy soft-fails and photos
/// stay empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBrowser;

#[async_trait]
impl BrowserLauncher for NoBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, StrategyError> {
        Err(StrategyError::Disabled)
    }
}
