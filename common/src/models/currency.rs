use crate::CurrencyCatalog;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Code of the currency all product prices are denominated in
pub const BASE_CURRENCY: &str = "USD";

/// A currency together with the rate it was last observed at.
///
/// Two currencies are equal when their codes match, whatever their rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code (e.g., "CHF")
    pub code: String,
    /// Units of this currency per one unit of the base currency
    pub exchange_rate: f64,
}

impl Currency {
    pub fn new(code: impl Into<String>, exchange_rate: f64) -> Self {
        Self {
            code: code.into(),
            exchange_rate,
        }
    }

    /// The base currency at a rate of 1.0
    pub fn base() -> Self {
        Self::new(BASE_CURRENCY, 1.0)
    }

    /// Builds a currency from a provider pair key such as "USDCHF",
    /// keeping only the trailing quote code.
    pub fn from_quote_key(quote_key: &str, exchange_rate: f64) -> Option<Self> {
        let code = quote_key.get(3..)?;
        if quote_key.len() != 6 || !is_currency_code(code) {
            return None;
        }
        Some(Self::new(code, exchange_rate))
    }

    /// Display name from the bundled catalog, e.g. "Swiss Franc"
    pub fn name(&self) -> Option<&'static str> {
        CurrencyCatalog::shared().name_for(&self.code)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::base()
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// True for three uppercase ASCII letters
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}
