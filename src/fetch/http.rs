//! HTTP fetch client backed by `ureq`
//!
//! `ureq` is blocking, so each request runs on tokio's blocking pool and the
//! caller only awaits the join handle.

use super::FetchClient;
use crate::error::FetchError;
use crate::types::ResponsePage;
use async_trait::async_trait;

#[derive(Clone)]
pub struct HttpFetchClient {
    agent: ureq::Agent,
}

impl HttpFetchClient {
    /// Client with `ureq`'s default agent settings. Request deadlines are
    /// enforced by the suggest actor, so they apply to every [`FetchClient`].
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for HttpFetchClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchClient for HttpFetchClient {
    async fn fetch(&self, url: &str) -> Result<ResponsePage, FetchError> {
        let agent = self.agent.clone();
        let url = url.to_string();

        log::debug!("GET {}", url);
        let body = tokio::task::spawn_blocking(move || get_body(&agent, &url))
            .await
            .map_err(|e| FetchError::Network(format!("request task failed: {}", e)))??;

        parse_page(&body)
    }
}

fn get_body(agent: &ureq::Agent, url: &str) -> Result<String, FetchError> {
    match agent.get(url).set("Accept", "application/json").call() {
        Ok(response) => response
            .into_string()
            .map_err(|e| FetchError::Network(e.to_string())),
        Err(ureq::Error::Status(code, _)) => Err(FetchError::Status(code)),
        Err(ureq::Error::Transport(transport)) => Err(FetchError::Network(transport.to_string())),
    }
}

/// Parse a result envelope body
pub fn parse_page(body: &str) -> Result<ResponsePage, FetchError> {
    Ok(serde_json::from_str(body)?)
}
