//! File persistence and serialization configuration

use crate::domain::DataKey;

pub struct PriceCacheSettings {
    /// Directory path for storing fetched price series
    pub directory: &'static str,
    /// Current version of the price cache serialization format
    pub version: f64,
    /// Maximum age of a cached series before it is refetched (seconds)
    pub acceptable_age_secs: i64,
}

pub struct PersistenceConfig {
    pub price_cache: PriceCacheSettings,
    /// Weights of the winning model. Overwritten on every run.
    pub weights_path: &'static str,
    /// Path for saving/loading application UI state
    pub app_state_path: &'static str,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    price_cache: PriceCacheSettings {
        directory: "price_data",
        version: 1.0,
        acceptable_age_secs: 86_400,
    },
    weights_path: "best_model_weights.safetensors",
    app_state_path: ".states.json",
};

/// Generate key-specific cache filename
/// Example: "prices_SPY_2020-01-01_2025-01-01_v1.bin"
pub fn price_cache_filename(key: &DataKey) -> String {
    format!(
        "prices_{}_{}_{}_v{}.bin",
        key.ticker,
        key.start.format("%Y-%m-%d"),
        key.end.format("%Y-%m-%d"),
        PERSISTENCE.price_cache.version
    )
}
