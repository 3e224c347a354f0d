use crate::config::{CurrencyLayerConfig, DEFAULT_CURRENCYLAYER_URL};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::ExchangeRateClient;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use common::{
    models::{is_currency_code, Currency, RateSnapshot},
    FetchError,
};
use reqwest::Url;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

const LIVE_ENDPOINT: &str = "live";

pub struct CurrencyLayerClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl CurrencyLayerClient {
    pub fn new() -> Self {
        Self::with_transport(DEFAULT_CURRENCYLAYER_URL, Arc::new(ReqwestTransport::new()))
    }

    pub fn from_config(config: &CurrencyLayerConfig) -> Result<Self, FetchError> {
        let transport = match config.timeout {
            Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
            None => ReqwestTransport::new(),
        };
        Ok(Self::with_transport(&config.base_url, Arc::new(transport)))
    }

    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    /// Resolves `live` against the base url and appends the access key
    fn endpoint(&self, api_key: &str) -> Result<Url, FetchError> {
        let mut base = self.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        let base = Url::parse(&base)
            .map_err(|e| FetchError::MalformedEndpoint(format!("{}: {}", self.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::MalformedEndpoint(format!(
                "{} cannot be used as a base url",
                self.base_url
            )));
        }

        let mut url = base
            .join(LIVE_ENDPOINT)
            .map_err(|e| FetchError::MalformedEndpoint(format!("{}: {}", self.base_url, e)))?;
        url.query_pairs_mut().append_pair("access_key", api_key);

        Ok(url)
    }
}

impl Default for CurrencyLayerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct LiveQuotesResponse {
    success: Option<bool>,
    timestamp: Option<i64>,
    source: Option<String>,
    quotes: Option<HashMap<String, f64>>,
    error: Option<ProviderFailure>,
}

#[derive(Debug, Deserialize)]
struct ProviderFailure {
    code: Option<i64>,
    info: Option<String>,
}

/// Decodes a `live` response body into a snapshot keyed by quote code
pub fn parse_live_quotes(body: &str) -> Result<RateSnapshot, FetchError> {
    let response: LiveQuotesResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::DecodeError(format!("Failed to parse live quotes: {}", e)))?;

    if response.success == Some(false) || response.error.is_some() {
        let (code, info) = response
            .error
            .map(|failure| (failure.code, failure.info))
            .unwrap_or((None, None));
        return Err(FetchError::DecodeError(format!(
            "Provider rejected the request (code {}): {}",
            code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()),
            info.unwrap_or_else(|| "no details".to_string())
        )));
    }

    let source = response
        .source
        .ok_or_else(|| FetchError::DecodeError("Missing field `source`".to_string()))?;
    if !is_currency_code(&source) {
        return Err(FetchError::DecodeError(format!(
            "Invalid source currency: {}",
            source
        )));
    }

    let unix_seconds = response
        .timestamp
        .ok_or_else(|| FetchError::DecodeError("Missing field `timestamp`".to_string()))?;
    let timestamp = Utc
        .timestamp_opt(unix_seconds, 0)
        .single()
        .ok_or_else(|| FetchError::DecodeError(format!("Invalid timestamp: {}", unix_seconds)))?;

    let quotes = response
        .quotes
        .ok_or_else(|| FetchError::DecodeError("Missing field `quotes`".to_string()))?;

    let mut rates = BTreeMap::new();
    for (pair, rate) in quotes {
        // Keys are the base code followed by the quote code, e.g. "USDCHF"
        let currency = pair
            .starts_with(source.as_str())
            .then(|| Currency::from_quote_key(&pair, rate))
            .flatten();
        let Some(currency) = currency else {
            warn!("Skipping quote with unexpected key: {}", pair);
            continue;
        };
        if !rate.is_finite() || rate <= 0.0 {
            warn!("Skipping non-positive rate for {}: {}", pair, rate);
            continue;
        }
        rates.insert(currency.code, rate);
    }

    Ok(RateSnapshot::new(source, timestamp, rates))
}

#[async_trait]
impl ExchangeRateClient for CurrencyLayerClient {
    async fn fetch_live_rates(&self, api_key: Option<&str>) -> Result<RateSnapshot, FetchError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(FetchError::MissingCredential)?;

        let url = self.endpoint(api_key)?;

        debug!("Fetching live quotes from CurrencyLayer: {}", url.path());

        let body = self.transport.get(&url).await?;
        let snapshot = parse_live_quotes(&body)?;

        info!(
            "Fetched {} live quotes against {} (as of {})",
            snapshot.len(),
            snapshot.base,
            snapshot.timestamp
        );

        Ok(snapshot)
    }
}
