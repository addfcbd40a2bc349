//! Retry and cooldown utilities shared by the HTTP strategies.
//!
//! [`retry_with_backoff`] retries transient failures (network, timeout, 5xx)
//! with exponential backoff and jitter. [`UpstreamCooldown`] is the only piece
//! of state shared across concurrent extractions: once the directory answers
//! with HTTP 429, every extraction in the process stops calling it until the
//! cooldown expires.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::StrategyError;

/// Cooldown applied when a 429 carries no usable `Retry-After` header.
pub(crate) const DEFAULT_COOLDOWN_SECS: u64 = 30;

const MAX_DELAY_MS: u64 = 10_000;

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors (see [`StrategyError::is_transient`]).
///
/// Back-off schedule with `backoff_base_ms = 250`:
///
/// | Attempt | Sleep before next attempt   |
/// |---------|-----------------------------|
/// | 1       | 250 ms × 2⁰ ± 25 % jitter   |
/// | 2       | 250 ms × 2¹ ± 25 % jitter   |
///
/// Delay is capped at 10 s. Non-transient errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, StrategyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StrategyError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient upstream error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Process-wide "do not call upstream until" marker.
///
/// Stored as milliseconds since the cooldown's creation so it can live in a
/// single atomic; concurrent trips keep the later deadline.
#[derive(Debug)]
pub struct UpstreamCooldown {
    origin: Instant,
    until_ms: AtomicU64,
}

impl Default for UpstreamCooldown {
    fn default() -> Self {
        Self::new()
    }
}

impl UpstreamCooldown {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            until_ms: AtomicU64::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Blocks upstream calls for `duration` from now, unless a longer cooldown
    /// is already in effect.
    pub fn trip(&self, duration: Duration) {
        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let until = self.now_ms().saturating_add(duration_ms);
        self.until_ms.fetch_max(until, Ordering::AcqRel);
        tracing::warn!(
            cooldown_ms = duration_ms,
            "upstream rate limit hit, pausing structured queries"
        );
    }

    /// Time left on the active cooldown, or `None` when calls are allowed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        let until = self.until_ms.load(Ordering::Acquire);
        let now = self.now_ms();
        (until > now).then(|| Duration::from_millis(until - now))
    }

    /// Returns [`StrategyError::BackingOff`] while a cooldown is active.
    pub(crate) fn check(&self) -> Result<(), StrategyError> {
        match self.remaining() {
            Some(left) => Err(StrategyError::BackingOff {
                remaining_secs: left.as_secs().max(1),
            }),
            None => Ok(()),
        }
    }

    /// Trips the cooldown when `err` is a rate-limit response.
    pub(crate) fn observe(&self, err: &StrategyError) {
        if let StrategyError::RateLimited { retry_after_secs } = err {
            self.trip(Duration::from_secs(*retry_after_secs));
        }
    }
}
