use async_trait::async_trait;
use common::FetchError;
use reqwest::Url;
use std::time::Duration;
use tracing::error;

/// Minimal HTTP GET seam between provider clients and the network
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET the url and return the response body
    async fn get(&self, url: &Url) -> Result<String, FetchError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<String, FetchError> {
        // The query string carries the access key, so errors drop the url
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            error!(
                "Exchange rate provider returned {} for {}",
                response.status(),
                url.path()
            );
        }

        let body = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)?
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;

        Ok(body)
    }
}
