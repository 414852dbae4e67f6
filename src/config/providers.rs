//! Market-data provider configuration (Yahoo Finance + Binance).

/// Configuration for the Binance REST API client
pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: PROVIDERS.binance.timeout_ms,
            retries: PROVIDERS.binance.retries,
            backoff_ms: PROVIDERS.binance.backoff_ms,
        }
    }
}

pub struct BinanceSettings {
    /// Klines returned per request (API maximum is 1000)
    pub klines_limit: i32,
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
    /// Quote assets that mark a ticker as a Binance pair
    pub quote_assets: &'static [&'static str],
}

pub struct YahooSettings {
    pub chart_url: &'static str,
    pub timeout_ms: u64,
    pub user_agent: &'static str,
}

pub struct ProvidersConfig {
    pub yahoo: YahooSettings,
    pub binance: BinanceSettings,
}

pub const PROVIDERS: ProvidersConfig = ProvidersConfig {
    yahoo: YahooSettings {
        chart_url: "https://query1.finance.yahoo.com/v8/finance/chart",
        timeout_ms: 10_000,
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)",
    },
    binance: BinanceSettings {
        klines_limit: 1000,
        timeout_ms: 5000,
        retries: 5,
        backoff_ms: 5000,
        quote_assets: &["USDT", "USDC", "FDUSD", "BTC", "ETH"],
    },
};
