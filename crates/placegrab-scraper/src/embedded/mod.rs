//! Embedded-state strategy: fetch the canonical mobile page and read the
//! hydration blob the server injected into it.

mod blob;
mod shape;

use std::collections::BTreeSet;
use std::sync::Arc;

use placegrab_core::{AppConfig, PlaceIdentifier, PlaceRecord};
use reqwest::Client;

use crate::error::StrategyError;
use crate::fetch::{build_client, fetch_page_html};
use crate::rate_limit::{retry_with_backoff, UpstreamCooldown};

/// Partial record plus the diagnostic typename inventory.
#[derive(Debug, Default)]
pub(crate) struct EmbeddedOutput {
    pub record: PlaceRecord,
    pub typenames: BTreeSet<String>,
}

/// Parses a page's markup. Pure, so fixture pages can be tested directly.
///
/// # Errors
///
/// [`StrategyError::MissingStateBlob`] or [`StrategyError::Deserialize`]
/// when the blob is absent or malformed.
pub(crate) fn extract_from_html(
    html: &str,
    canonical_id: &str,
) -> Result<EmbeddedOutput, StrategyError> {
    let state = blob::parse_state_blob(html)?;
    Ok(EmbeddedOutput {
        record: shape::record_from_state(&state, canonical_id),
        typenames: shape::typename_inventory(&state),
    })
}

#[derive(Debug, Clone)]
pub(crate) struct EmbeddedState {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
    cooldown: Arc<UpstreamCooldown>,
}

impl EmbeddedState {
    pub(crate) fn new(
        config: &AppConfig,
        cooldown: Arc<UpstreamCooldown>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(config.http_timeout_secs, &config.user_agent, true)?,
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            cooldown,
        })
    }

    pub(crate) async fn fetch(&self, id: &PlaceIdentifier) -> Result<EmbeddedOutput, StrategyError> {
        let html = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            fetch_page_html(&self.client, &id.canonical_url, None)
        })
        .await
        .inspect_err(|e| self.cooldown.observe(e))?;

        let output = extract_from_html(&html, &id.canonical_id)?;
        tracing::debug!(
            place_id = %id.canonical_id,
            fields = ?output.record.populated_fields(),
            typenames = output.typenames.len(),
            "embedded state parsed"
        );
        Ok(output)
    }
}
