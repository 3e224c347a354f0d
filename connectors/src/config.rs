use std::time::Duration;

pub const DEFAULT_CURRENCYLAYER_URL: &str = "http://apilayer.net/api/";

/// Configuration for the CurrencyLayer live quotes client
#[derive(Debug, Clone)]
pub struct CurrencyLayerConfig {
    /// API root; the `live` endpoint is resolved against it
    pub base_url: String,
    /// Access key, if one is configured
    pub api_key: Option<String>,
    /// Request timeout applied by the transport
    pub timeout: Option<Duration>,
}

impl Default for CurrencyLayerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CURRENCYLAYER_URL.to_string(),
            api_key: None,
            timeout: None,
        }
    }
}

impl CurrencyLayerConfig {
    /// Create a new client configuration from environment variables.
    ///
    /// A missing `CURRENCYLAYER_API_KEY` is not an error here; fetches
    /// report it as a missing credential.
    pub fn from_env() -> Self {
        let base_url = std::env::var("CURRENCYLAYER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_CURRENCYLAYER_URL.to_string());
        let api_key = std::env::var("CURRENCYLAYER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let timeout = std::env::var("CURRENCYLAYER_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse().ok())
            .map(Duration::from_secs);

        Self {
            base_url,
            api_key,
            timeout,
        }
    }
}
