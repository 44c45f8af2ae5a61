use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::catalog::{CatalogEnvelope, RemoteProductRecord};
use crate::domain::types::CatalogUrl;

/// Ways a catalog fetch can come back empty-handed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The endpoint could not be reached or the body could not be read.
    #[error("catalog unreachable: {0}")]
    Transport(String),
    /// The body is not a catalog envelope.
    #[error("malformed catalog response: {0}")]
    Malformed(String),
    /// The envelope carried the error flag or no records.
    #[error("catalog reported an error or returned no products")]
    Rejected,
}

/// Source of remote product records.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RemoteProductRecord>, FetchError>;
}

/// Decode a response body into its product records.
pub fn parse_envelope(body: &str) -> Result<Vec<RemoteProductRecord>, FetchError> {
    let envelope: CatalogEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if envelope.error || envelope.data.is_empty() {
        return Err(FetchError::Rejected);
    }
    Ok(envelope.data)
}

/// [`CatalogSource`] reading the catalog over HTTP.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    url: CatalogUrl,
}

impl HttpCatalogClient {
    pub fn new(
        url: CatalogUrl,
        accept_invalid_certs: bool,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch(&self) -> Result<Vec<RemoteProductRecord>, FetchError> {
        let response = self
            .client
            .get(self.url.as_str())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        // The status code is ignored; an error page fails to decode instead.
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        parse_envelope(&body)
    }
}
