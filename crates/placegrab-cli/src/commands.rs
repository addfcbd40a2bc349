//! Command handlers. Each prints pretty JSON to stdout and maps the outcome
//! to a process exit code.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use placegrab_core::{load_rules, AppConfig, ExtractionRules};
use placegrab_scraper::{Extractor, UrlResolver};

/// Exit code when extraction failed and the caller must enter data by hand.
pub(crate) const EXIT_NEEDS_MANUAL_INPUT: u8 = 2;

#[derive(Debug, Default)]
pub(crate) struct ExtractOptions {
    pub rules_path: Option<PathBuf>,
    pub no_browser: bool,
    pub report: bool,
}

/// Loads the rules file if one is configured, otherwise the built-in rules.
pub(crate) fn resolve_rules(path: Option<&PathBuf>) -> anyhow::Result<ExtractionRules> {
    match path {
        Some(path) => load_rules(path)
            .with_context(|| format!("failed to load rules from {}", path.display())),
        None => Ok(ExtractionRules::default()),
    }
}

pub(crate) async fn run_extract(
    mut config: AppConfig,
    url: &str,
    options: &ExtractOptions,
) -> anyhow::Result<ExitCode> {
    if options.no_browser {
        config.browser_enabled = false;
    }
    let rules = resolve_rules(options.rules_path.as_ref())?;
    tracing::debug!(
        required_fields = ?rules.required_fields,
        browser_enabled = config.browser_enabled,
        "starting extraction"
    );

    let extractor = Extractor::new(&config, rules).context("failed to build HTTP clients")?;
    let (result, report) = extractor.extract_with_report(url).await;

    let output = if options.report {
        serde_json::json!({ "result": result, "report": report })
    } else {
        serde_json::to_value(&result)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NEEDS_MANUAL_INPUT)
    })
}

pub(crate) async fn run_resolve(config: &AppConfig, url: &str) -> anyhow::Result<ExitCode> {
    let resolver = UrlResolver::new(config).context("failed to build HTTP client")?;
    let id = resolver.resolve(url).await?;
    println!("{}", serde_json::to_string_pretty(&id)?);
    Ok(ExitCode::SUCCESS)
}
