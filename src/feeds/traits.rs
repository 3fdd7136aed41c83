use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::FetchError;

/// Source of raw JSON documents. The HTTP implementation is used at
/// runtime; tests script their own.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher (for logging)
    fn name(&self) -> &'static str;

    /// GET `url` and parse the body as JSON
    async fn get_json(&self, url: &Url) -> Result<Value, FetchError>;
}

/// Unauthenticated GET over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("digital-card/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
