mod currency;
mod product;
mod rates;

pub use currency::{is_currency_code, Currency, BASE_CURRENCY};
pub use product::Product;
pub use rates::RateSnapshot;
