use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub browser_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub browser_enabled: bool,
    pub chromium_path: Option<PathBuf>,
    pub rules_path: Option<PathBuf>,
    pub query_endpoint: String,
    pub mobile_base_url: String,
    pub short_link_hosts: Vec<String>,
}
