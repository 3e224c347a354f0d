use crate::flag::country_flag_for;
use crate::formatter::CurrencyFormatter;
use common::{
    models::{Currency, Product, RateSnapshot},
    CurrencyCatalog,
};
use serde::Serialize;
use tracing::warn;

/// Shown in place of an amount that could not be formatted
pub const UNKNOWN_AMOUNT: &str = "?";

/// A currency as offered for selection, with its flag and name
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrencyListing {
    pub code: String,
    pub exchange_rate: f64,
    pub flag: Option<String>,
    pub name: Option<String>,
}

impl CurrencyListing {
    /// "CHF 🇨🇭 Swiss Franc", skipping whichever parts are unknown
    pub fn title(&self) -> String {
        [
            Some(self.code.as_str()),
            self.flag.as_deref(),
            self.name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn currency(&self) -> Currency {
        Currency::new(self.code.clone(), self.exchange_rate)
    }
}

/// Prices products in whichever currency the caller has selected
pub struct PricingEngine {
    formatter: CurrencyFormatter,
    catalog: &'static CurrencyCatalog,
}

impl PricingEngine {
    pub fn new() -> Self {
        Self::with_formatter(CurrencyFormatter::new())
    }

    pub fn with_formatter(formatter: CurrencyFormatter) -> Self {
        Self {
            formatter,
            catalog: CurrencyCatalog::shared(),
        }
    }

    pub fn with_catalog(mut self, catalog: &'static CurrencyCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Unit price of a product converted into `currency`
    pub fn line_total(&self, product: &Product, currency: &Currency) -> String {
        self.format_or_placeholder(currency, product.unit_price)
    }

    /// "$0.95 a bag"
    pub fn unit_price_label(&self, product: &Product, currency: &Currency) -> String {
        format!("{} a {}", self.line_total(product, currency), product.unit)
    }

    /// Sum of price times quantity over the catalog, in the base currency
    pub fn base_total(&self, products: &[Product]) -> f64 {
        products.iter().map(Product::subtotal).sum()
    }

    /// Cart total converted into `currency`
    pub fn grand_total(&self, products: &[Product], currency: &Currency) -> String {
        self.format_or_placeholder(currency, self.base_total(products))
    }

    pub fn listing(&self, currency: &Currency) -> CurrencyListing {
        CurrencyListing {
            code: currency.code.clone(),
            exchange_rate: currency.exchange_rate,
            flag: country_flag_for(&currency.code),
            name: self.catalog.name_for(&currency.code).map(str::to_string),
        }
    }

    /// Every currency in the snapshot, sorted by code and enriched for display
    pub fn listings(&self, snapshot: &RateSnapshot) -> Vec<CurrencyListing> {
        snapshot
            .currencies()
            .iter()
            .map(|currency| self.listing(currency))
            .collect()
    }

    fn format_or_placeholder(&self, currency: &Currency, base_amount: f64) -> String {
        self.formatter
            .format_converted(currency, base_amount)
            .unwrap_or_else(|| {
                warn!("Could not format {} {}", base_amount, currency.code);
                UNKNOWN_AMOUNT.to_string()
            })
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn cart() -> Vec<Product> {
        vec![
            Product::new("Peas", "bag", "bags", 0.95).with_quantity(2),
            Product::new("Eggs", "dozen", "dozen", 2.10).with_quantity(1),
        ]
    }

    #[test]
    fn test_grand_total_in_base_currency() {
        let engine = PricingEngine::new();
        assert_eq!(engine.grand_total(&cart(), &Currency::base()), "$4.00");
    }

    #[test]
    fn test_grand_total_converted() {
        let engine = PricingEngine::new();
        let chf = Currency::new("CHF", 1.1);
        assert_eq!(engine.grand_total(&cart(), &chf), "CHF4.40");
        assert_eq!(
            engine.grand_total(&cart(), &chf),
            CurrencyFormatter::new().format("CHF", 4.00 * 1.1).unwrap()
        );
    }

    #[test]
    fn test_grand_total_ignores_order() {
        let engine = PricingEngine::new();
        let mut products = vec![
            Product::new("Peas", "bag", "bags", 0.95).with_quantity(3),
            Product::new("Eggs", "dozen", "dozen", 2.10).with_quantity(1),
            Product::new("Milk", "bottle", "bottles", 1.30).with_quantity(2),
            Product::new("Beans", "can", "cans", 0.73).with_quantity(5),
        ];
        let currencies = [
            Currency::base(),
            Currency::new("CHF", 0.97),
            Currency::new("BTC", 0.000264),
        ];
        let expected: Vec<String> = currencies
            .iter()
            .map(|c| engine.grand_total(&products, c))
            .collect();

        for _ in 0..products.len() {
            products.rotate_left(1);
            let totals: Vec<String> = currencies
                .iter()
                .map(|c| engine.grand_total(&products, c))
                .collect();
            assert_eq!(totals, expected);
        }
        products.reverse();
        assert_eq!(engine.grand_total(&products, &currencies[0]), expected[0]);
    }

    #[test]
    fn test_empty_cart() {
        let engine = PricingEngine::new();
        assert_eq!(engine.grand_total(&[], &Currency::base()), "$0.00");
        assert_eq!(engine.base_total(&[]), 0.0);
    }

    #[test]
    fn test_line_total_and_label() {
        let engine = PricingEngine::new();
        let peas = Product::new("Peas", "bag", "bags", 0.95).with_quantity(4);

        assert_eq!(engine.line_total(&peas, &Currency::base()), "$0.95");
        assert_eq!(engine.unit_price_label(&peas, &Currency::base()), "$0.95 a bag");
        assert_eq!(
            engine.unit_price_label(&peas, &Currency::new("EUR", 0.84)),
            "€0.80 a bag"
        );
    }

    #[test]
    fn test_unformattable_amount_degrades_to_placeholder() {
        let engine = PricingEngine::new();
        let peas = Product::new("Peas", "bag", "bags", 0.95);
        assert_eq!(engine.line_total(&peas, &Currency::new("us", 1.0)), UNKNOWN_AMOUNT);
        assert_eq!(
            engine.line_total(&peas, &Currency::new("USD", f64::INFINITY)),
            UNKNOWN_AMOUNT
        );

        // Rounds up past the largest representable decimal
        let vault = Product::new("Vault", "crate", "crates", 1.58456324e31);
        assert_eq!(
            engine.line_total(&vault, &Currency::new("XAU", 0.005)),
            UNKNOWN_AMOUNT
        );
    }

    #[test]
    fn test_listings() {
        let engine = PricingEngine::new();
        let timestamp = Utc.timestamp_opt(1_506_175_745, 0).unwrap();
        let rates = [("CHF", 0.91), ("XAU", 0.00078), ("BTC", 0.000264)]
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect();
        let snapshot = RateSnapshot::new("USD", timestamp, rates);

        let listings = engine.listings(&snapshot);
        let titles: Vec<String> = listings.iter().map(CurrencyListing::title).collect();
        assert_eq!(
            titles,
            vec![
                "BTC \u{20BF} Bitcoin",
                "CHF 🇨🇭 Swiss Franc",
                "USD 🇺🇸 United States Dollar",
                "XAU Gold (troy ounce)",
            ]
        );
        assert_eq!(listings[1].currency(), Currency::new("CHF", 0.0));
        assert_eq!(listings[1].exchange_rate, 0.91);
    }

    #[test]
    fn test_listing_without_catalog_names() {
        let empty: &'static CurrencyCatalog = Box::leak(Box::new(CurrencyCatalog::from_json("")));
        let engine = PricingEngine::new().with_catalog(empty);
        let listing = engine.listing(&Currency::new("CHF", 0.91));
        assert_eq!(listing.name, None);
        assert_eq!(listing.title(), "CHF 🇨🇭");
    }
}
