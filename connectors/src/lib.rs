pub mod config;
pub mod currencylayer;
pub mod transport;

use async_trait::async_trait;
use common::{models::RateSnapshot, FetchError};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

pub use config::CurrencyLayerConfig;
pub use currencylayer::CurrencyLayerClient;
pub use transport::{HttpTransport, ReqwestTransport};

/// Trait defining the interface for live exchange rate providers
#[async_trait]
pub trait ExchangeRateClient: Send + Sync {
    /// Fetch the latest rates of every quote currency against the provider's base
    async fn fetch_live_rates(&self, api_key: Option<&str>)
        -> Result<RateSnapshot, FetchError>;
}

/// Runs a fetch on its own task. The receiver resolves exactly once with
/// either the snapshot or the error; dropping it discards the result.
pub fn spawn_fetch(
    client: Arc<dyn ExchangeRateClient>,
    api_key: Option<String>,
) -> oneshot::Receiver<Result<RateSnapshot, FetchError>> {
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let result = client.fetch_live_rates(api_key.as_deref()).await;
        if tx.send(result).is_err() {
            debug!("Rate fetch completed after its receiver was dropped");
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ExchangeRateClient for CountingClient {
        async fn fetch_live_rates(
            &self,
            api_key: Option<&str>,
        ) -> Result<RateSnapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match api_key {
                Some(_) => {
                    let mut rates = BTreeMap::new();
                    rates.insert("CHF".to_string(), 0.91);
                    Ok(RateSnapshot::new("USD", Utc::now(), rates))
                }
                None => Err(FetchError::MissingCredential),
            }
        }
    }

    #[tokio::test]
    async fn test_spawn_fetch_delivers_snapshot() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
        });
        let rx = spawn_fetch(client.clone(), Some("key".to_string()));

        let snapshot = rx.await.unwrap().unwrap();
        assert_eq!(snapshot.rate_for("CHF"), Some(0.91));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spawn_fetch_delivers_error() {
        let client = Arc::new(CountingClient {
            calls: AtomicUsize::new(0),
        });
        let rx = spawn_fetch(client, None);

        let result = rx.await.unwrap();
        assert!(matches!(result, Err(FetchError::MissingCredential)));
    }
}
