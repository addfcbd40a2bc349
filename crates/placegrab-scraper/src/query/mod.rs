//! Structured-query strategy: one batched POST to the directory's internal
//! query endpoint.
//!
//! The endpoint rejects requests that do not look like they come from the
//! listing page, so every call carries the configured browser user agent and
//! a `Referer` equal to the canonical page URL.

mod operations;
mod parse;

use std::sync::Arc;

use placegrab_core::{AppConfig, PlaceIdentifier, PlaceRecord};
use reqwest::Client;

use crate::error::StrategyError;
use crate::fetch::{build_client, check_status};
use crate::rate_limit::{retry_with_backoff, UpstreamCooldown};

#[derive(Debug, Clone)]
pub(crate) struct StructuredQuery {
    client: Client,
    endpoint: String,
    max_retries: u32,
    backoff_base_ms: u64,
    cooldown: Arc<UpstreamCooldown>,
}

impl StructuredQuery {
    pub(crate) fn new(
        config: &AppConfig,
        cooldown: Arc<UpstreamCooldown>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(config.http_timeout_secs, &config.user_agent, true)?,
            endpoint: config.query_endpoint.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            cooldown,
        })
    }

    /// Runs the entity-specific batch for `id`.
    ///
    /// Returns a partial record; phone and photos are never set here. When
    /// the upstream answers `NOT_FOUND` for the basic-info operation and
    /// nothing else was recovered, the result is [`StrategyError::NotFound`].
    ///
    /// # Errors
    ///
    /// Any [`StrategyError`]; all of them are soft failures for the caller.
    pub(crate) async fn fetch(&self, id: &PlaceIdentifier) -> Result<PlaceRecord, StrategyError> {
        self.cooldown.check()?;

        let ops = operations::operations_for(id);
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send(&ops, &id.canonical_url)
        })
        .await
        .inspect_err(|e| self.cooldown.observe(e))?;

        let outcome = parse::parse_batch(&ops, &body, id.entity_type);
        if outcome.record.is_empty() && !outcome.not_found.is_empty() {
            return Err(StrategyError::NotFound {
                what: format!(
                    "{} {} ({})",
                    id.entity_type,
                    id.canonical_id,
                    outcome.not_found.join(", ")
                ),
            });
        }

        tracing::debug!(
            place_id = %id.canonical_id,
            fields = ?outcome.record.populated_fields(),
            "structured query parsed"
        );
        Ok(outcome.record)
    }

    async fn send(
        &self,
        ops: &[operations::Operation],
        referer: &str,
    ) -> Result<serde_json::Value, StrategyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::REFERER, referer)
            .header(reqwest::header::ACCEPT, "*/*")
            .header(reqwest::header::ACCEPT_LANGUAGE, "ko")
            .json(ops)
            .send()
            .await?;
        let response = check_status(response, &self.endpoint)?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| StrategyError::Deserialize {
            context: "query endpoint response".to_owned(),
            source,
        })
    }
}
