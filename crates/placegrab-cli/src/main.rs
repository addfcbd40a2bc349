mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "placegrab")]
#[command(about = "Extract a business profile from a place listing URL")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full extraction cascade and print the result as JSON
    Extract {
        /// Listing URL (short link, desktop map link or mobile link)
        url: String,

        /// YAML rules file; overrides PLACEGRAB_RULES_PATH
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Skip the headless-browser photo strategy
        #[arg(long)]
        no_browser: bool,

        /// Print per-strategy diagnostics alongside the result
        #[arg(long)]
        report: bool,
    },
    /// Normalize a URL into its canonical place identifier
    Resolve {
        /// Listing URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = placegrab_core::load_app_config()?;

    // Logs go to stderr so stdout stays valid JSON.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Extract {
            url,
            rules,
            no_browser,
            report,
        } => {
            let options = commands::ExtractOptions {
                rules_path: rules.or_else(|| config.rules_path.clone()),
                no_browser,
                report,
            };
            commands::run_extract(config, &url, &options).await
        }
        Commands::Resolve { url } => commands::run_resolve(&config, &url).await,
    }
}
