//! Fetching result pages from the search endpoint
//!
//! The controller only sees the [`FetchClient`] trait. Clients do not dedupe
//! or order requests; stale responses are filtered by the controller.

pub mod http;

pub use http::HttpFetchClient;

use crate::config::SuggestConfig;
use crate::error::{ConfigError, FetchError};
use crate::types::ResponsePage;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except the URI-component unreserved set
/// (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`)
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Performs one GET against the search endpoint and parses the envelope
#[async_trait]
pub trait FetchClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ResponsePage, FetchError>;
}

/// `searchUrl` with `{searchParam}={term}&{pageParam}={page}` appended to its
/// query. An existing query is kept and a fragment stays at the end.
pub fn build_search_url(config: &SuggestConfig, term: &str, page: u32) -> Result<String, ConfigError> {
    let mut url = config.parsed_search_url()?;

    let params = format!(
        "{}={}&{}={}",
        encode_component(&config.search_parameter_name),
        encode_component(term),
        encode_component(&config.pagination_parameter_name),
        page
    );
    let query = match url.query() {
        Some(existing) if !existing.is_empty() && !existing.ends_with('&') => {
            format!("{}&{}", existing, params)
        }
        Some(existing) => format!("{}{}", existing, params),
        None => params,
    };
    url.set_query(Some(&query));

    Ok(url.into())
}

/// Percent-encode a query component the way browsers' `encodeURIComponent` does
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}
