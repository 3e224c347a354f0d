pub mod catalog;
pub mod error;
pub mod models;

pub use catalog::CurrencyCatalog;
pub use error::{Error, FetchError};
pub type Result<T> = std::result::Result<T, Error>;
