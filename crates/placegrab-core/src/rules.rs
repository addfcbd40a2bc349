//! Tunable extraction rules.
//!
//! The completeness gate and every photo-filter heuristic are upstream-specific
//! guesses, so they live in data rather than code. A YAML file can override
//! any subset; missing keys fall back to [`ExtractionRules::default`].

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::place::RequiredField;
use crate::ConfigError;

/// Query-parameter rewrite applied to every surviving photo URL to request a
/// larger rendition, e.g. `type=w750`.
///
/// This is tied to the current CDN's parameter contract and may silently
/// produce broken URLs if that contract changes; set `upgrade: null` in the
/// rules file to disable it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUpgradeRule {
    pub param: String,
    pub value: String,
}

/// Query parameter added to the photo sub-route to select business-submitted
/// photos over visitor uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoFilterParam {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoRules {
    pub max_photos: usize,
    /// URLs shorter than this are assumed to be placeholders or sprites.
    pub min_url_length: usize,
    /// Host substrings; a URL must contain one of them in its host.
    pub allowed_hosts: Vec<String>,
    /// Case-insensitive path keywords that disqualify a URL.
    pub blocked_keywords: Vec<String>,
    pub upgrade: Option<PhotoUpgradeRule>,
    pub filter_param: Option<PhotoFilterParam>,
}

impl Default for PhotoRules {
    fn default() -> Self {
        Self {
            max_photos: 10,
            min_url_length: 40,
            allowed_hosts: vec!["pstatic.net".to_string(), "naver.net".to_string()],
            blocked_keywords: vec![
                "icon".to_string(),
                "logo".to_string(),
                "profile".to_string(),
            ],
            upgrade: Some(PhotoUpgradeRule {
                param: "type".to_string(),
                value: "w750".to_string(),
            }),
            filter_param: Some(PhotoFilterParam {
                name: "filterType".to_string(),
                value: "업체사진".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Fields a merged record must carry to count as a success.
    pub required_fields: Vec<RequiredField>,
    pub photos: PhotoRules,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            required_fields: RequiredField::DEFAULT_GATE.to_vec(),
            photos: PhotoRules::default(),
        }
    }
}

impl ExtractionRules {
    /// Parse and validate rules from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RulesFileParse`] on malformed YAML and
    /// [`ConfigError::Validation`] when a value is out of range.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let rules: ExtractionRules = serde_yaml::from_str(content)?;
        validate_rules(&rules)?;
        Ok(rules)
    }
}

/// Load and validate extraction rules from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_rules(path: &Path) -> Result<ExtractionRules, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    ExtractionRules::from_yaml(&content)
}

fn validate_rules(rules: &ExtractionRules) -> Result<(), ConfigError> {
    if rules.required_fields.is_empty() {
        return Err(ConfigError::Validation(
            "required_fields must name at least one field".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for field in &rules.required_fields {
        if !seen.insert(*field) {
            return Err(ConfigError::Validation(format!(
                "duplicate required field: '{field}'"
            )));
        }
    }

    let photos = &rules.photos;
    if !(1..=50).contains(&photos.max_photos) {
        return Err(ConfigError::Validation(format!(
            "photos.max_photos must be between 1 and 50, got {}",
            photos.max_photos
        )));
    }

    if photos.allowed_hosts.is_empty() {
        return Err(ConfigError::Validation(
            "photos.allowed_hosts must list at least one host".to_string(),
        ));
    }
    if photos.allowed_hosts.iter().any(|h| h.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "photos.allowed_hosts must not contain blank entries".to_string(),
        ));
    }
    if photos.blocked_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "photos.blocked_keywords must not contain blank entries".to_string(),
        ));
    }

    if let Some(upgrade) = &photos.upgrade {
        if upgrade.param.trim().is_empty() {
            return Err(ConfigError::Validation(
                "photos.upgrade.param must be non-empty".to_string(),
            ));
        }
    }
    if let Some(filter) = &photos.filter_param {
        if filter.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "photos.filter_param.name must be non-empty".to_string(),
            ));
        }
    }

    Ok(())
}
