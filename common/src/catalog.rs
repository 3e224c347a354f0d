use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Bundled ISO 4217 code -> display name table
const BUNDLED_CURRENCY_NAMES: &str = include_str!("../data/currency-names.json");

static SHARED_CATALOG: OnceLock<CurrencyCatalog> = OnceLock::new();

/// Read-only lookup of currency display names
#[derive(Debug, Clone, Default)]
pub struct CurrencyCatalog {
    names: HashMap<String, String>,
}

impl CurrencyCatalog {
    /// Process-wide catalog, parsed from the bundled table on first use
    pub fn shared() -> &'static CurrencyCatalog {
        SHARED_CATALOG.get_or_init(|| {
            let catalog = Self::from_json(BUNDLED_CURRENCY_NAMES);
            debug!("Loaded currency catalog with {} names", catalog.len());
            catalog
        })
    }

    /// Parses a JSON object of code -> name. Unparsable input yields an
    /// empty catalog.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<HashMap<String, String>>(json) {
            Ok(names) => Self { names },
            Err(e) => {
                warn!("Failed to parse currency names, names will be unavailable: {}", e);
                Self::default()
            }
        }
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
