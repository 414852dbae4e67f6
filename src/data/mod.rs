// Price data loading and caching
pub mod binance;
pub mod cache_file;
pub mod fetch;
pub mod local_cache;
pub mod price_source;
pub mod yahoo;

// Re-export commonly used types
pub use cache_file::CacheFile;
pub use fetch::fetch_price_series;
pub use price_source::{PriceSource, get_price_series_async};
