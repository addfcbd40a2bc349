//! Low-level HTTP helpers shared by the resolver and the HTTP strategies.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::StrategyError;
use crate::rate_limit::DEFAULT_COOLDOWN_SECS;

/// Builds a client with the configured timeout and browser-like user agent.
///
/// The resolver uses `follow_redirects = false` so a short link's `Location`
/// header can be read without downloading the target page.
pub(crate) fn build_client(
    timeout_secs: u64,
    user_agent: &str,
    follow_redirects: bool,
) -> Result<Client, reqwest::Error> {
    let redirect = if follow_redirects {
        reqwest::redirect::Policy::limited(5)
    } else {
        reqwest::redirect::Policy::none()
    };
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .redirect(redirect)
        .build()
}

/// Maps non-success statuses to typed errors; passes 2xx responses through.
pub(crate) fn check_status(response: Response, url: &str) -> Result<Response, StrategyError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_COOLDOWN_SECS);
        return Err(StrategyError::RateLimited { retry_after_secs });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(StrategyError::NotFound {
            what: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Err(StrategyError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response)
}

/// GET a page's HTML with browser-like headers.
pub(crate) async fn fetch_page_html(
    client: &Client,
    url: &str,
    referer: Option<&str>,
) -> Result<String, StrategyError> {
    let mut request = client
        .get(url)
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en-US;q=0.8")
        .header(reqwest::header::CACHE_CONTROL, "no-cache");

    if let Some(referer) = referer {
        request = request.header(reqwest::header::REFERER, referer);
    }

    let response = check_status(request.send().await?, url)?;
    Ok(response.text().await?)
}
