//! Controller configuration
//!
//! Every widget instance gets its own [`SuggestConfig`]; nothing is read from
//! process-wide state, so several controllers can target different endpoints.

use crate::error::ConfigError;
use crate::format::FormatterKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestConfig {
    /// Base endpoint, e.g. `https://rickandmortyapi.com/api/character/`
    pub search_url: String,
    /// Query key carrying the search term
    pub search_parameter_name: String,
    /// Query key carrying the page number
    pub pagination_parameter_name: String,
    #[serde(default)]
    pub formatter: FormatterKind,
    /// Debounce delay; 0 defers the search to the next scheduler tick
    #[serde(default)]
    pub delay_ms: u64,
    /// Presentation hint only; match positions are always computed
    #[serde(default = "default_true")]
    pub enable_highlight: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    /// Cancel the transport of a superseded request instead of only ignoring it
    #[serde(default = "default_true")]
    pub abort_superseded: bool,
    /// Distance from the end of the list that still counts as "at the bottom"
    #[serde(default)]
    pub scroll_threshold: u32,
}

fn default_true() -> bool {
    true
}

impl SuggestConfig {
    pub fn new(
        search_url: impl Into<String>,
        search_parameter_name: impl Into<String>,
        pagination_parameter_name: impl Into<String>,
    ) -> Self {
        Self {
            search_url: search_url.into(),
            search_parameter_name: search_parameter_name.into(),
            pagination_parameter_name: pagination_parameter_name.into(),
            formatter: FormatterKind::Default,
            delay_ms: 0,
            enable_highlight: true,
            request_timeout_ms: None,
            abort_superseded: true,
            scroll_threshold: 0,
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_formatter(mut self, formatter: FormatterKind) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_highlight(mut self, enable_highlight: bool) -> Self {
        self.enable_highlight = enable_highlight;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    pub fn with_abort_superseded(mut self, abort: bool) -> Self {
        self.abort_superseded = abort;
        self
    }

    pub fn with_scroll_threshold(mut self, threshold: u32) -> Self {
        self.scroll_threshold = threshold;
        self
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// `search_url` as an absolute URL
    pub fn parsed_search_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.search_url).map_err(|source| ConfigError::InvalidUrl {
            url: self.search_url.clone(),
            source,
        })
    }

    /// Check that all required values are present and the endpoint parses
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_url.trim().is_empty() {
            return Err(ConfigError::MissingField("searchUrl"));
        }
        if self.search_parameter_name.trim().is_empty() {
            return Err(ConfigError::MissingField("searchParameterName"));
        }
        if self.pagination_parameter_name.trim().is_empty() {
            return Err(ConfigError::MissingField("paginationParameterName"));
        }
        self.parsed_search_url()?;
        Ok(())
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SuggestConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
