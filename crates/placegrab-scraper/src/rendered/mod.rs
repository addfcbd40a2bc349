//! Rendered-DOM strategy: drive a headless browser to the listing's photo
//! view and harvest image URLs.
//!
//! Only `photos` is ever populated here. The session is acquired at entry,
//! bounded by the browser timeout as a whole, and closed before returning on
//! every path. Closing has its own bound so a wedged browser cannot stall
//! the pipeline.

mod browser;
mod chromium;
mod photos;

use std::sync::Arc;
use std::time::Duration;

use placegrab_core::{AppConfig, PhotoRules, PlaceIdentifier, PlaceRecord};

pub use browser::{BrowserLauncher, BrowserSession, NoBrowser};
pub use chromium::{find_chromium, ChromiumLauncher};
pub use photos::{photo_route, select_photos};

use crate::error::StrategyError;

/// Upper bound on session teardown, independent of the harvest budget.
const CLOSE_TIMEOUT_SECS: u64 = 5;

#[derive(Clone)]
pub(crate) struct RenderedDom {
    launcher: Arc<dyn BrowserLauncher>,
    timeout_secs: u64,
    settle_delay: Duration,
    rules: PhotoRules,
}

impl std::fmt::Debug for RenderedDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedDom")
            .field("timeout_secs", &self.timeout_secs)
            .field("settle_delay", &self.settle_delay)
            .finish_non_exhaustive()
    }
}

impl RenderedDom {
    pub(crate) fn new(
        config: &AppConfig,
        launcher: Arc<dyn BrowserLauncher>,
        rules: PhotoRules,
    ) -> Self {
        Self {
            launcher,
            timeout_secs: config.browser_timeout_secs,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            rules,
        }
    }

    /// Returns a record carrying only `photos`.
    ///
    /// # Errors
    ///
    /// Whatever the launcher reports (a disabled launcher yields
    /// [`StrategyError::Disabled`]), [`StrategyError::Timeout`] when the whole
    /// run exceeds the budget, or any navigation error as
    /// [`StrategyError::Browser`].
    pub(crate) async fn fetch(&self, id: &PlaceIdentifier) -> Result<PlaceRecord, StrategyError> {
        let budget = Duration::from_secs(self.timeout_secs);
        let timed_out = || StrategyError::Timeout {
            secs: self.timeout_secs,
        };

        let started = tokio::time::Instant::now();
        let mut session = tokio::time::timeout(budget, self.launcher.launch())
            .await
            .map_err(|_| timed_out())??;

        let remaining = budget.saturating_sub(started.elapsed());
        let photo_url = photo_route(&id.canonical_url, self.rules.filter_param.as_ref());
        let harvested = tokio::time::timeout(
            remaining,
            self.harvest(session.as_mut(), &id.canonical_url, &photo_url),
        )
        .await;

        let close_budget = Duration::from_secs(self.timeout_secs.min(CLOSE_TIMEOUT_SECS));
        match tokio::time::timeout(close_budget, session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(place_id = %id.canonical_id, error = %e, "browser session close failed");
            }
            Err(_) => {
                tracing::warn!(
                    place_id = %id.canonical_id,
                    secs = close_budget.as_secs(),
                    "browser session close timed out; abandoning session"
                );
            }
        }

        let raw = harvested.map_err(|_| timed_out())??;
        let photos = select_photos(&raw, &self.rules);
        tracing::debug!(
            place_id = %id.canonical_id,
            candidates = raw.len(),
            kept = photos.len(),
            "photos harvested"
        );

        Ok(PlaceRecord {
            photos,
            ..PlaceRecord::default()
        })
    }

    async fn harvest(
        &self,
        session: &mut dyn BrowserSession,
        canonical_url: &str,
        photo_url: &str,
    ) -> Result<Vec<String>, StrategyError> {
        session.goto(canonical_url).await?;
        session.goto(photo_url).await?;
        session.scroll_to_bottom().await?;
        tokio::time::sleep(self.settle_delay).await;
        session.image_sources().await
    }
}
