use chrono::{DateTime, Utc};
use common::{
    models::{Currency, Product, RateSnapshot},
    Error, Result,
};
use connectors::ExchangeRateClient;
use pricing::{CurrencyListing, PricingEngine};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

pub type SharedService = Arc<RwLock<ShopService>>;

/// A product as shown in the shopping list
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductLine {
    pub name: String,
    pub quantity: u32,
    /// Unit matching the quantity, e.g. "bags"
    pub unit_label: String,
    /// Unit price in the selected currency, e.g. "$0.95 a bag"
    pub price_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartTotal {
    pub currency: CurrencyListing,
    /// Formatted total in the selected currency
    pub total: String,
    /// Unformatted total in the base currency
    pub base_total: f64,
}

/// The currency selector: the latest rates and the current pick
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrencyBoard {
    pub updated_at: DateTime<Utc>,
    pub selected: String,
    pub currencies: Vec<CurrencyListing>,
}

/// Service holding the cart and the currency selection
pub struct ShopService {
    /// Live exchange rate provider
    client: Arc<dyn ExchangeRateClient>,
    /// Provider access key, if configured
    api_key: Option<String>,
    engine: PricingEngine,
    /// Catalog in display order, with quantities
    products: Vec<Product>,
    /// Currency every price is shown in
    selected: Currency,
    /// Latest successful rate fetch
    snapshot: Option<RateSnapshot>,
}

impl ShopService {
    pub fn new(client: Arc<dyn ExchangeRateClient>, api_key: Option<String>) -> Self {
        // Initialize with the grocery catalog
        let products = vec![
            Product::new("Peas", "bag", "bags", 0.95),
            Product::new("Eggs", "dozen", "dozen", 2.10),
            Product::new("Milk", "bottle", "bottles", 1.30),
            Product::new("Beans", "can", "cans", 0.73),
        ];

        Self::with_products(client, api_key, products)
    }

    pub fn with_products(
        client: Arc<dyn ExchangeRateClient>,
        api_key: Option<String>,
        products: Vec<Product>,
    ) -> Self {
        Self {
            client,
            api_key,
            engine: PricingEngine::new(),
            products,
            selected: Currency::base(),
            snapshot: None,
        }
    }

    pub fn selected_currency(&self) -> &Currency {
        &self.selected
    }

    /// List the catalog with prices in the selected currency
    pub fn products(&self) -> Vec<ProductLine> {
        self.products.iter().map(|p| self.product_line(p)).collect()
    }

    /// Set the quantity of a product, matched by name ignoring case
    pub fn set_quantity(&mut self, name: &str, quantity: u32) -> Result<ProductLine> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::NotFound(format!("Product '{}' not found", name)))?;

        debug!("Setting quantity of {} to {}", product.name, quantity);
        product.quantity = quantity;

        let product = product.clone();
        Ok(self.product_line(&product))
    }

    pub fn cart_total(&self) -> CartTotal {
        CartTotal {
            currency: self.engine.listing(&self.selected),
            total: self.engine.grand_total(&self.products, &self.selected),
            base_total: self.engine.base_total(&self.products),
        }
    }

    /// What a rate fetch needs, so the network call runs without the lock
    pub fn rate_source(&self) -> (Arc<dyn ExchangeRateClient>, Option<String>) {
        (self.client.clone(), self.api_key.clone())
    }

    /// Replace the rate snapshot wholesale. The selection keeps the rate it
    /// was picked with.
    pub fn apply_snapshot(&mut self, snapshot: RateSnapshot) -> CurrencyBoard {
        info!(
            "Exchange rates updated: {} quotes as of {}",
            snapshot.len(),
            snapshot.timestamp
        );
        self.snapshot = Some(snapshot);
        self.board_for_current_snapshot()
            .unwrap_or_else(|| self.empty_board())
    }

    pub fn currency_board(&self) -> Option<CurrencyBoard> {
        self.board_for_current_snapshot()
    }

    /// Select a currency from the latest snapshot. The base currency is
    /// always available.
    pub fn select_currency(&mut self, code: &str) -> Result<CartTotal> {
        let code = code.trim().to_uppercase();

        let currency = match &self.snapshot {
            Some(snapshot) => snapshot.currency(&code),
            None if code == Currency::base().code => Some(Currency::base()),
            None => {
                return Err(Error::NotFound(
                    "No exchange rates loaded yet; refresh the currency list first".to_string(),
                ))
            }
        }
        .ok_or_else(|| {
            Error::NotFound(format!("Currency '{}' is not in the latest rates", code))
        })?;

        info!("Selected currency {} at rate {}", currency.code, currency.exchange_rate);
        self.selected = currency;

        Ok(self.cart_total())
    }

    fn product_line(&self, product: &Product) -> ProductLine {
        ProductLine {
            name: product.name.clone(),
            quantity: product.quantity,
            unit_label: product.unit_label(product.quantity).to_string(),
            price_label: self.engine.unit_price_label(product, &self.selected),
        }
    }

    fn board_for_current_snapshot(&self) -> Option<CurrencyBoard> {
        self.snapshot.as_ref().map(|snapshot| CurrencyBoard {
            updated_at: snapshot.timestamp,
            selected: self.selected.code.clone(),
            currencies: self.engine.listings(snapshot),
        })
    }

    fn empty_board(&self) -> CurrencyBoard {
        CurrencyBoard {
            updated_at: Utc::now(),
            selected: self.selected.code.clone(),
            currencies: Vec::new(),
        }
    }
}

/// Fetch live rates and store them. The lock is not held across the fetch.
pub async fn refresh_rates(service: &SharedService) -> Result<CurrencyBoard> {
    let (client, api_key) = service.read().await.rate_source();

    let snapshot = client
        .fetch_live_rates(api_key.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to update exchange rates: {}", e);
            Error::RateFetch(e)
        })?;

    Ok(service.write().await.apply_snapshot(snapshot))
}
