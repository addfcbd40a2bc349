//! The extraction orchestrator.
//!
//! Strategies run strictly in sequence, cheapest first:
//!
//! 1. resolve the URL (hard stop on failure)
//! 2. structured query
//! 3. embedded state, only while the working record fails the completeness gate
//! 4. rendered DOM, whenever the working record still has no photos
//!
//! Results are folded together with [`fill_empty`], so a later strategy can
//! only fill gaps. The method reported on success is the strategy whose
//! contribution first made the record pass the gate.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use placegrab_core::{
    AppConfig, ExtractionMethod, ExtractionResult, ExtractionRules, PlaceIdentifier, PlaceRecord,
    RequiredField,
};
use serde::Serialize;

use crate::embedded::EmbeddedState;
use crate::error::{ExtractError, StrategyError};
use crate::merge::{fill_empty, fill_photos};
use crate::query::StructuredQuery;
use crate::rate_limit::UpstreamCooldown;
use crate::rendered::{BrowserLauncher, ChromiumLauncher, NoBrowser, RenderedDom};
use crate::resolver::UrlResolver;

/// Pipeline state, logged on every transition and reported at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    NotStarted,
    Resolving,
    Querying(ExtractionMethod),
    Merging,
    Done { success: bool },
}

/// One strategy invocation as seen by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAttempt {
    pub method: ExtractionMethod,
    /// Fields this strategy filled in the working record.
    pub contributed: Vec<RequiredField>,
    /// Soft-failure description, when the strategy failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StrategyAttempt {
    fn summary(&self) -> String {
        match (&self.error, self.contributed.is_empty()) {
            (Some(error), _) => error.clone(),
            (None, true) => format!("{}: no usable fields", self.method),
            (None, false) => {
                let fields: Vec<&str> = self.contributed.iter().map(|f| f.as_str()).collect();
                format!("{}: partial ({})", self.method, fields.join(", "))
            }
        }
    }
}

/// Diagnostics for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<PlaceIdentifier>,
    pub attempts: Vec<StrategyAttempt>,
    /// `__typename` inventory from the embedded state, when it was read.
    pub typenames: BTreeSet<String>,
    pub stage: Stage,
    pub elapsed_ms: u64,
}

impl ExtractionReport {
    fn new() -> Self {
        Self {
            place: None,
            attempts: Vec::new(),
            typenames: BTreeSet::new(),
            stage: Stage::NotStarted,
            elapsed_ms: 0,
        }
    }

    fn advance(&mut self, next: Stage) {
        tracing::debug!(from = ?self.stage, to = ?next, "extraction stage");
        self.stage = next;
    }

    /// Methods attempted, in order.
    #[must_use]
    pub fn attempted_methods(&self) -> Vec<ExtractionMethod> {
        self.attempts.iter().map(|a| a.method).collect()
    }
}

#[derive(Debug, Default)]
struct StrategyOutput {
    record: PlaceRecord,
    typenames: BTreeSet<String>,
}

/// Runs the full cascade for a URL. Cheap to clone; clones share the HTTP
/// connection pools, the browser launcher and the upstream cooldown.
#[derive(Debug, Clone)]
pub struct Extractor {
    resolver: UrlResolver,
    query: StructuredQuery,
    embedded: EmbeddedState,
    rendered: RenderedDom,
    gate: Vec<RequiredField>,
    cooldown: Arc<UpstreamCooldown>,
}

impl Extractor {
    /// Builds an extractor with a Chromium launcher (or [`NoBrowser`] when
    /// browser automation is disabled) and a fresh upstream cooldown.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if an HTTP client cannot be constructed.
    pub fn new(config: &AppConfig, rules: ExtractionRules) -> Result<Self, reqwest::Error> {
        let launcher: Arc<dyn BrowserLauncher> = if config.browser_enabled {
            Arc::new(ChromiumLauncher::from_config(config))
        } else {
            Arc::new(NoBrowser)
        };
        Self::with_parts(config, rules, launcher, Arc::new(UpstreamCooldown::new()))
    }

    /// Builds an extractor around an explicit launcher and cooldown, so that
    /// several extractors can share one cooldown or tests can inject a fake
    /// browser.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if an HTTP client cannot be constructed.
    pub fn with_parts(
        config: &AppConfig,
        rules: ExtractionRules,
        launcher: Arc<dyn BrowserLauncher>,
        cooldown: Arc<UpstreamCooldown>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            resolver: UrlResolver::new(config)?,
            query: StructuredQuery::new(config, Arc::clone(&cooldown))?,
            embedded: EmbeddedState::new(config, Arc::clone(&cooldown))?,
            rendered: RenderedDom::new(config, launcher, rules.photos),
            gate: rules.required_fields,
            cooldown,
        })
    }

    #[must_use]
    pub fn cooldown(&self) -> &Arc<UpstreamCooldown> {
        &self.cooldown
    }

    /// Extracts a business profile from `url`. Never fails: every error is
    /// folded into an unsuccessful [`ExtractionResult`].
    pub async fn extract(&self, url: &str) -> ExtractionResult {
        self.extract_with_report(url).await.0
    }

    /// Like [`Extractor::extract`], also returning per-strategy diagnostics.
    pub async fn extract_with_report(&self, url: &str) -> (ExtractionResult, ExtractionReport) {
        let started = Instant::now();
        let mut report = ExtractionReport::new();
        let result = self.run(url, &mut report).await;
        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        report.advance(Stage::Done {
            success: result.success,
        });

        if result.success {
            tracing::info!(
                url,
                method = ?result.method,
                elapsed_ms = report.elapsed_ms,
                "extraction succeeded"
            );
        } else {
            tracing::info!(
                url,
                error = result.error.as_deref().unwrap_or_default(),
                elapsed_ms = report.elapsed_ms,
                "extraction needs manual input"
            );
        }
        (result, report)
    }

    async fn run(&self, url: &str, report: &mut ExtractionReport) -> ExtractionResult {
        report.advance(Stage::Resolving);
        let id = match self.resolver.resolve(url).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(url, error = %e, "URL resolution failed");
                return ExtractionResult::failed(e.to_string(), None);
            }
        };
        report.place = Some(id.clone());

        let mut working = PlaceRecord::default();
        let mut method = None;

        for step in [ExtractionMethod::StructuredQuery, ExtractionMethod::EmbeddedState] {
            if working.satisfies(&self.gate) {
                break;
            }
            self.attempt(step, &id, &mut working, report, fill_empty).await;
            if method.is_none() && working.satisfies(&self.gate) {
                method = Some(step);
            }
        }

        if working.photos.is_empty() {
            self.attempt(ExtractionMethod::RenderedDom, &id, &mut working, report, fill_photos)
                .await;
            if method.is_none() && working.satisfies(&self.gate) {
                method = Some(ExtractionMethod::RenderedDom);
            }
        }

        report.advance(Stage::Merging);
        match method {
            Some(method) => ExtractionResult::succeeded(working, method),
            None => {
                let err = ExtractError::AllStrategiesExhausted {
                    attempts: report.attempts.iter().map(StrategyAttempt::summary).collect(),
                };
                tracing::warn!(place_id = %id.canonical_id, error = %err, "no strategy produced a usable record");
                ExtractionResult::failed(err.to_string(), Some(working))
            }
        }
    }

    /// Runs one strategy and folds its output into `working` with `merge`.
    /// Failures are recorded as soft failures and never propagate.
    async fn attempt(
        &self,
        step: ExtractionMethod,
        id: &PlaceIdentifier,
        working: &mut PlaceRecord,
        report: &mut ExtractionReport,
        merge: fn(&mut PlaceRecord, PlaceRecord) -> Vec<RequiredField>,
    ) {
        report.advance(Stage::Querying(step));

        let attempt = match self.dispatch(step, id).await {
            Ok(output) => {
                report.typenames.extend(output.typenames);
                let contributed = merge(working, output.record);
                tracing::debug!(
                    place_id = %id.canonical_id,
                    method = %step,
                    contributed = ?contributed,
                    "strategy finished"
                );
                StrategyAttempt {
                    method: step,
                    contributed,
                    error: None,
                }
            }
            Err(source) => {
                let soft = ExtractError::StrategySoftFailure {
                    method: step,
                    source,
                };
                tracing::warn!(place_id = %id.canonical_id, error = %soft, "strategy soft failure");
                StrategyAttempt {
                    method: step,
                    contributed: Vec::new(),
                    error: Some(soft.to_string()),
                }
            }
        };
        report.attempts.push(attempt);
    }

    async fn dispatch(
        &self,
        step: ExtractionMethod,
        id: &PlaceIdentifier,
    ) -> Result<StrategyOutput, StrategyError> {
        match step {
            ExtractionMethod::StructuredQuery => {
                let record = self.query.fetch(id).await?;
                Ok(StrategyOutput {
                    record,
                    ..StrategyOutput::default()
                })
            }
            ExtractionMethod::EmbeddedState => {
                let output = self.embedded.fetch(id).await?;
                Ok(StrategyOutput {
                    record: output.record,
                    typenames: output.typenames,
                })
            }
            ExtractionMethod::RenderedDom => {
                let record = self.rendered.fetch(id).await?;
                Ok(StrategyOutput {
                    record,
                    ..StrategyOutput::default()
                })
            }
        }
    }
}
