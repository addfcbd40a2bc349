//! URL normalization: every accepted link shape becomes a [`PlaceIdentifier`].
//!
//! Recognized shapes:
//!
//! | Shape | Example |
//! |-------|---------|
//! | short link | `https://naver.me/5GkXyZ1a` (one redirect hop is followed) |
//! | desktop search | `https://map.naver.com/p/search/비스트로/place/1826027582?c=15.00,0,0,0,dh` |
//! | desktop entry | `https://map.naver.com/p/entry/place/1826027582` |
//! | mobile canonical | `https://m.place.naver.com/restaurant/1826027582/home` |
//!
//! Anything else is rejected with [`ExtractError::InvalidUrl`].

use std::sync::LazyLock;

use placegrab_core::{AppConfig, EntityType, PlaceIdentifier};
use regex::Regex;
use reqwest::{Client, Url};

use crate::error::ExtractError;
use crate::fetch::build_client;

static EMBEDDED_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'<>]+"#).expect("valid regex"));

const DESKTOP_HOSTS: [&str; 1] = ["map.naver.com"];
const MOBILE_HOSTS: [&str; 2] = ["m.place.naver.com", "pcmap.place.naver.com"];
const MAX_ID_LEN: usize = 20;

/// Which of the recognized link shapes a URL has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlShape {
    ShortLink,
    DesktopSearch,
    DesktopEntry,
    MobileCanonical,
    Unrecognized,
}

/// Resolves caller-supplied URLs. Holds a non-redirecting client so short
/// links cost one request and no body download.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    client: Client,
    short_link_hosts: Vec<String>,
    mobile_base_url: String,
}

impl UrlResolver {
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(config.http_timeout_secs, &config.user_agent, false)?;
        Ok(Self {
            client,
            short_link_hosts: config.short_link_hosts.clone(),
            mobile_base_url: config.mobile_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Normalizes `raw_url` into a [`PlaceIdentifier`].
    ///
    /// Text around the link is tolerated (share sheets often prepend the
    /// listing name). Short links are followed for exactly one hop.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidUrl`] when no numeric identifier can be derived.
    /// - [`ExtractError::ResolutionFailed`] when the short-link request fails
    ///   or does not answer with a redirect.
    pub async fn resolve(&self, raw_url: &str) -> Result<PlaceIdentifier, ExtractError> {
        let url = parse_input(raw_url).ok_or_else(|| ExtractError::InvalidUrl {
            url: raw_url.to_owned(),
            reason: "not a URL".to_owned(),
        })?;

        let target = match self.classify(&url) {
            UrlShape::ShortLink => {
                let target = self.follow_short_link(raw_url, &url).await?;
                if self.classify(&target) == UrlShape::ShortLink {
                    return Err(ExtractError::InvalidUrl {
                        url: raw_url.to_owned(),
                        reason: "short link redirects to another short link".to_owned(),
                    });
                }
                tracing::debug!(raw_url, target = %target, "followed short link");
                target
            }
            UrlShape::Unrecognized => {
                return Err(ExtractError::InvalidUrl {
                    url: raw_url.to_owned(),
                    reason: "unrecognized host or path".to_owned(),
                });
            }
            UrlShape::DesktopSearch | UrlShape::DesktopEntry | UrlShape::MobileCanonical => url,
        };

        if self.classify(&target) == UrlShape::Unrecognized {
            return Err(ExtractError::InvalidUrl {
                url: raw_url.to_owned(),
                reason: format!("redirect target {target} is not a place link"),
            });
        }

        let (canonical_id, entity_type) =
            place_id_from_path(&target).ok_or_else(|| ExtractError::InvalidUrl {
                url: raw_url.to_owned(),
                reason: "no numeric place identifier in path".to_owned(),
            })?;

        let canonical_url = canonical_url(&self.mobile_base_url, entity_type, &canonical_id);
        tracing::debug!(
            raw_url,
            canonical_id,
            entity_type = %entity_type,
            "resolved place URL"
        );

        Ok(PlaceIdentifier {
            raw_url: raw_url.to_owned(),
            canonical_id,
            entity_type,
            canonical_url,
        })
    }

    /// Classifies a parsed URL by host and path.
    #[must_use]
    pub fn classify(&self, url: &Url) -> UrlShape {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return UrlShape::Unrecognized;
        };

        if self.short_link_hosts.iter().any(|h| *h == host) {
            return UrlShape::ShortLink;
        }

        let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();

        if DESKTOP_HOSTS.contains(&host.as_str()) {
            if segments.contains(&"search") && place_id_from_path(url).is_some() {
                return UrlShape::DesktopSearch;
            }
            if place_id_from_path(url).is_some() {
                return UrlShape::DesktopEntry;
            }
            return UrlShape::Unrecognized;
        }

        if self.is_mobile_host(url) && place_id_from_path(url).is_some() {
            return UrlShape::MobileCanonical;
        }

        UrlShape::Unrecognized
    }

    fn is_mobile_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if MOBILE_HOSTS.contains(&host.to_ascii_lowercase().as_str()) {
            return true;
        }
        // A self-hosted or mocked mobile base counts as canonical too.
        Url::parse(&self.mobile_base_url).is_ok_and(|base| {
            base.host_str() == Some(host) && base.port_or_known_default() == url.port_or_known_default()
        })
    }

    async fn follow_short_link(&self, raw_url: &str, url: &Url) -> Result<Url, ExtractError> {
        let failed = |reason: String| ExtractError::ResolutionFailed {
            url: raw_url.to_owned(),
            reason,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_redirection() {
            return Err(failed(format!("expected a redirect, got HTTP {status}")));
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| failed("redirect without a Location header".to_owned()))?;

        url.join(location).map_err(|e| ExtractError::InvalidUrl {
            url: raw_url.to_owned(),
            reason: format!("redirect target \"{location}\" is not a URL: {e}"),
        })
    }
}

/// Parses caller input, tolerating surrounding text and a missing scheme.
fn parse_input(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(m) = EMBEDDED_URL_RE.find(trimmed) {
        return Url::parse(m.as_str()).ok();
    }

    // Bare "naver.me/abc" style input.
    if trimmed.contains('.') && !trimmed.contains(char::is_whitespace) {
        return Url::parse(&format!("https://{trimmed}")).ok();
    }

    None
}

/// Finds the first `place|restaurant/<digits>` segment pair in the path.
pub(crate) fn place_id_from_path(url: &Url) -> Option<(String, EntityType)> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    segments.windows(2).find_map(|pair| {
        let entity = EntityType::from_path_segment(pair[0])?;
        let id = pair[1];
        let numeric =
            !id.is_empty() && id.len() <= MAX_ID_LEN && id.bytes().all(|b| b.is_ascii_digit());
        numeric.then(|| (id.to_owned(), entity))
    })
}

/// Mobile canonical page for a listing.
pub(crate) fn canonical_url(mobile_base_url: &str, entity_type: EntityType, id: &str) -> String {
    format!(
        "{}/{}/{id}/home",
        mobile_base_url.trim_end_matches('/'),
        entity_type.path_segment()
    )
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
