pub mod engine;
pub mod flag;
pub mod formatter;

pub use engine::{CurrencyListing, PricingEngine, UNKNOWN_AMOUNT};
pub use flag::country_flag_for;
pub use formatter::{CurrencyFormatter, NumberLocale, Precision};
