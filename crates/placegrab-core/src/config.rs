use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Mobile Safari on iOS; the mobile canonical page serves its full state blob
/// to this family of user agents.
pub(crate) const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";
pub(crate) const DEFAULT_QUERY_ENDPOINT: &str = "https://pcmap-api.place.naver.com/graphql";
pub(crate) const DEFAULT_MOBILE_BASE_URL: &str = "https://m.place.naver.com";
pub(crate) const DEFAULT_SHORT_LINK_HOSTS: &str = "naver.me";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// configuration pointed at the production directory.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_u64(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let trimmed = raw.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(invalid(var, format!("'{raw}' is not an http(s) URL")));
        }
        Ok(trimmed.to_string())
    };

    let env = parse_environment(&or_default("PLACEGRAB_ENV", "development"))?;
    let log_level = or_default("PLACEGRAB_LOG_LEVEL", "info");

    let http_timeout_secs = parse_positive_u64("PLACEGRAB_HTTP_TIMEOUT_SECS", "5")?;
    let browser_timeout_secs = parse_positive_u64("PLACEGRAB_BROWSER_TIMEOUT_SECS", "30")?;
    let settle_delay_ms = parse_u64("PLACEGRAB_SETTLE_DELAY_MS", "1500")?;
    let user_agent = or_default("PLACEGRAB_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("PLACEGRAB_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("PLACEGRAB_RETRY_BACKOFF_BASE_MS", "250")?;
    let browser_enabled = parse_bool("PLACEGRAB_BROWSER_ENABLED", "true")?;

    let chromium_path = lookup("PLACEGRAB_CHROMIUM_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let rules_path = lookup("PLACEGRAB_RULES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let query_endpoint = parse_url("PLACEGRAB_QUERY_ENDPOINT", DEFAULT_QUERY_ENDPOINT)?;
    let mobile_base_url = parse_url("PLACEGRAB_MOBILE_BASE_URL", DEFAULT_MOBILE_BASE_URL)?;

    let short_link_hosts: Vec<String> =
        or_default("PLACEGRAB_SHORT_LINK_HOSTS", DEFAULT_SHORT_LINK_HOSTS)
            .split(',')
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
    if short_link_hosts.is_empty() {
        return Err(invalid(
            "PLACEGRAB_SHORT_LINK_HOSTS",
            "at least one host is required".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        http_timeout_secs,
        browser_timeout_secs,
        settle_delay_ms,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        browser_enabled,
        chromium_path,
        rules_path,
        query_endpoint,
        mobile_base_url,
        short_link_hosts,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PLACEGRAB_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

impl AppConfig {
    /// Configuration with every default applied, ignoring the process
    /// environment. Intended for tests and embedding callers.
    #[must_use]
    pub fn defaults() -> Self {
        match build_app_config(|_| Err(std::env::VarError::NotPresent)) {
            Ok(config) => config,
            Err(e) => unreachable!("built-in defaults are valid: {e}"),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
