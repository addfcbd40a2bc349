use placegrab_core::ExtractionMethod;
use thiserror::Error;

/// Pipeline-level failures, as surfaced to callers of the extractor.
///
/// Only [`ExtractError::InvalidUrl`], [`ExtractError::ResolutionFailed`] and
/// [`ExtractError::AllStrategiesExhausted`] ever reach an
/// [`ExtractionResult`](placegrab_core::ExtractionResult); soft failures are
/// folded into the orchestrator's decisions and the extraction report.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid place URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not resolve \"{url}\": {reason}")]
    ResolutionFailed { url: String, reason: String },

    #[error("{method} soft failure: {source}")]
    StrategySoftFailure {
        method: ExtractionMethod,
        #[source]
        source: StrategyError,
    },

    #[error("all strategies exhausted: {}", .attempts.join("; "))]
    AllStrategiesExhausted { attempts: Vec<String> },
}

/// Strategy-local failure. Never fatal to the pipeline: the orchestrator
/// records it and moves on to the next strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("upstream cooldown active ({remaining_secs}s remaining)")]
    BackingOff { remaining_secs: u64 },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("embedded state blob not found in page")]
    MissingStateBlob,

    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("strategy disabled by configuration")]
    Disabled,
}

impl StrategyError {
    /// Transient conditions worth another attempt after a backoff delay:
    /// network failures, timeouts and 5xx responses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            StrategyError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            StrategyError::UnexpectedStatus { status, .. } => *status >= 500,
            StrategyError::Timeout { .. } => true,
            StrategyError::RateLimited { .. }
            | StrategyError::BackingOff { .. }
            | StrategyError::NotFound { .. }
            | StrategyError::Deserialize { .. }
            | StrategyError::MissingStateBlob
            | StrategyError::Browser(_)
            | StrategyError::Disabled => false,
        }
    }
}
