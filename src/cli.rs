//! Command-line entry point for the terminal widget

use crate::config::SuggestConfig;
use crate::error::ConfigError;
use crate::fetch::HttpFetchClient;
use crate::format::FormatterKind;
use crate::tui::run_tui;
use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Target;
use log::debug;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_SEARCH_URL: &str = "https://rickandmortyapi.com/api/character/";

/// autosuggest - search-as-you-type against a paginated JSON endpoint
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON config file; flags given on the command line override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Search endpoint
    #[arg(long)]
    pub url: Option<String>,

    /// Query parameter carrying the search term
    #[arg(long)]
    pub search_param: Option<String>,

    /// Query parameter carrying the page number
    #[arg(long)]
    pub page_param: Option<String>,

    /// Debounce delay in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Strip everything but letters, digits, whitespace and '-' from the input
    #[arg(long)]
    pub alphanumeric: bool,

    /// Do not highlight the matched term in suggestions
    #[arg(long)]
    pub no_highlight: bool,

    /// Give up on a request after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Write log output (filtered by RUST_LOG) to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Resolve the widget configuration from the config file and flags
    pub fn to_config(&self) -> Result<SuggestConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                SuggestConfig::from_json_file(path)?
            }
            None => SuggestConfig::new(DEFAULT_SEARCH_URL, "name", "page"),
        };

        if let Some(url) = &self.url {
            config.search_url = url.clone();
        }
        if let Some(param) = &self.search_param {
            config.search_parameter_name = param.clone();
        }
        if let Some(param) = &self.page_param {
            config.pagination_parameter_name = param.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if self.alphanumeric {
            config.formatter = FormatterKind::Alphanumeric;
        }
        if self.no_highlight {
            config.enable_highlight = false;
        }
        if self.timeout_ms.is_some() {
            config.request_timeout_ms = self.timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Logger configured from `RUST_LOG`. The terminal widget owns the screen,
/// so a log file keeps output from drawing over it.
pub fn log_builder(log_file: Option<&Path>) -> Result<env_logger::Builder> {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    Ok(builder)
}

/// CLI実行エントリーポイント
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    log_builder(cli.log_file.as_deref())?.try_init()?;
    let config = cli.to_config().context("invalid configuration")?;

    debug!("Searching {}", config.search_url);

    let client = Arc::new(HttpFetchClient::new());
    let selected = run_tui(config, client).await?;

    for item in selected {
        println!("{}", serde_json::to_string(&item)?);
    }
    Ok(())
}
