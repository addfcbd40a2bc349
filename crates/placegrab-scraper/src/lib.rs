//! Business-profile extraction from local-directory listing URLs.
//!
//! [`Extractor::extract`] is the single inbound operation: it resolves the
//! URL, runs the strategy cascade (structured query, embedded state,
//! rendered DOM) and returns an [`ExtractionResult`](placegrab_core::ExtractionResult).

mod embedded;
pub mod error;
mod extractor;
mod fetch;
mod merge;
mod normalize;
mod query;
mod rate_limit;
pub mod rendered;
pub mod resolver;

pub use error::{ExtractError, StrategyError};
pub use extractor::{ExtractionReport, Extractor, Stage, StrategyAttempt};
pub use rate_limit::UpstreamCooldown;
pub use rendered::{
    find_chromium, photo_route, select_photos, BrowserLauncher, BrowserSession, ChromiumLauncher,
    NoBrowser,
};
pub use resolver::{UrlResolver, UrlShape};
