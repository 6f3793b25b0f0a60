mod amount;
mod cache;
mod loader;
mod parser;
mod types;

pub use amount::{CurrencyAmount, FxConversionError};
pub use cache::FxCache;
pub use iso_currency::Currency;
pub use loader::{FxLoaderError, RateFile, load_cache_from_files};
pub use parser::{FxParseError, parse_monthly_rates};
pub use types::{RateEntry, RateKey, RateSource};
