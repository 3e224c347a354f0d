use crate::models::Currency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One fetched set of live rates against a single base currency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateSnapshot {
    /// Base currency code (e.g., USD)
    pub base: String,
    /// Time at which the provider observed these rates
    pub timestamp: DateTime<Utc>,
    /// Quote currency code -> units per one unit of base
    pub rates: BTreeMap<String, f64>,
}

impl RateSnapshot {
    pub fn new(
        base: impl Into<String>,
        timestamp: DateTime<Utc>,
        rates: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            base: base.into(),
            timestamp,
            rates,
        }
    }

    /// Rate for a quote code. The base is always present at 1.0.
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        match self.rates.get(code) {
            Some(rate) => Some(*rate),
            None if code == self.base => Some(1.0),
            None => None,
        }
    }

    pub fn currency(&self, code: &str) -> Option<Currency> {
        self.rate_for(code).map(|rate| Currency::new(code, rate))
    }

    /// All quoted currencies plus the base, sorted by code
    pub fn currencies(&self) -> Vec<Currency> {
        let mut currencies: Vec<Currency> = self
            .rates
            .iter()
            .map(|(code, rate)| Currency::new(code.clone(), *rate))
            .collect();

        if !self.rates.contains_key(&self.base) {
            let position = currencies
                .binary_search_by(|c| c.code.as_str().cmp(self.base.as_str()))
                .unwrap_or_else(|pos| pos);
            currencies.insert(position, Currency::new(self.base.clone(), 1.0));
        }

        currencies
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
