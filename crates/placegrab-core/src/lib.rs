//! Shared domain types and configuration for placegrab.
//!
//! Nothing in this crate performs I/O beyond reading configuration; the
//! extraction pipeline itself lives in `placegrab-scraper`.

mod app_config;
mod config;
pub mod place;
pub mod rules;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use place::{
    EntityType, ExtractionMethod, ExtractionResult, MenuItem, MenuPrice, PlaceIdentifier,
    PlaceRecord, RequiredField,
};
pub use rules::{load_rules, ExtractionRules, PhotoFilterParam, PhotoRules, PhotoUpgradeRule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read rules file {path}: {source}")]
    RulesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules file: {0}")]
    RulesFileParse(#[from] serde_yaml::Error),

    #[error("rules validation failed: {0}")]
    Validation(String),
}
