use std::path::PathBuf;

/// Failure classes reported by a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    NetworkFailure,
    NonOkStatus,
    ParseFailure,
}

/// Error returned by a [`crate::fetch::FetchClient`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure, including timeouts
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("server responded with status {0}")]
    Status(u16),

    /// The body was not a valid result envelope
    #[error("malformed response body: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network(_) => FetchErrorKind::NetworkFailure,
            FetchError::Status(_) => FetchErrorKind::NonOkStatus,
            FetchError::Parse(_) => FetchErrorKind::ParseFailure,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

/// Error raised while loading or validating a [`crate::config::SuggestConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration value: {0}")]
    MissingField(&'static str),

    #[error("invalid search URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
