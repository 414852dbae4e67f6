//! Binance spot daily klines provider, for crypto pairs such as BTCUSDT.

use std::collections::HashSet;
use std::fmt;

use anyhow::{Result, bail};
use async_trait::async_trait;
use binance_sdk::config::ConfigurationRestApi;
use binance_sdk::spot::{
    SpotRestApi,
    rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
};
use binance_sdk::{errors, errors::ConnectorError as connection_error};

use crate::config::PROVIDERS;
use crate::config::providers::BinanceApiConfig;
use crate::data::price_source::PriceSource;
use crate::domain::{DataKey, PriceBar};
use crate::models::PriceSeries;
use crate::utils::TimeUtils;

// Custom error type for kline conversion and connection failures.
#[derive(Debug)]
pub enum BNKlineError {
    InvalidLength,
    InvalidType(String),
    ConnectionFailed(String),
}

impl fmt::Display for BNKlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BNKlineError::InvalidLength => write!(f, "Invalid length"),
            BNKlineError::InvalidType(string) => write!(f, "Invalid type: {}", string),
            BNKlineError::ConnectionFailed(msg) => {
                write!(f, "Binance API connection failed: {}.", msg)
            }
        }
    }
}

impl std::error::Error for BNKlineError {}

// Prices arrive as strings; anything else (or an unparsable string) is a gap.
fn item_to_float(item: Option<KlinesItemInner>) -> Option<f64> {
    item.and_then(|inner| {
        if let KlinesItemInner::String(s) = inner {
            s.parse::<f64>().ok()
        } else {
            None
        }
    })
}

fn kline_to_bar(raw: Vec<KlinesItemInner>) -> Result<PriceBar, BNKlineError> {
    let mut items = raw.into_iter();
    let timestamp_ms = match items.next().ok_or(BNKlineError::InvalidLength)? {
        KlinesItemInner::Integer(a) => a,
        _ => return Err(BNKlineError::InvalidType("open_time".to_string())),
    };
    Ok(PriceBar {
        timestamp_ms,
        open: item_to_float(items.next()),
        high: item_to_float(items.next()),
        low: item_to_float(items.next()),
        close: item_to_float(items.next()),
        volume: item_to_float(items.next()),
    })
}

fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<PriceBar>, BNKlineError> {
    data.into_iter().map(kline_to_bar).collect()
}

fn configure_binance_client() -> Result<RestApi> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    Ok(SpotRestApi::production(rest_conf))
}

async fn fetch_klines_page(
    rest_client: &RestApi,
    params: KlinesParams,
    key: &DataKey,
) -> Result<Vec<Vec<KlinesItemInner>>> {
    match rest_client.klines(params).await {
        Ok(r) => Ok(r.data().await?),
        Err(e) => {
            if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                match conn_err {
                    connection_error::TooManyRequestsError(msg) => {
                        log::error!("{} Rate limit exceeded. {}", key.ticker, msg);
                    }
                    connection_error::RateLimitBanError(msg) => {
                        log::error!("{} IP address banned by rate limits. {}", key.ticker, msg);
                    }
                    connection_error::BadRequestError(msg) => {
                        log::error!("{} Bad request (unknown symbol?). {}", key.ticker, msg);
                    }
                    errors::ConnectorError::NetworkError(msg) => {
                        log::error!("{} Network error. {}", key.ticker, msg);
                    }
                    other => {
                        log::error!("{} Binance connector error: {:?}", key.ticker, other);
                    }
                }
                Err(
                    anyhow::Error::new(BNKlineError::ConnectionFailed(conn_err.to_string()))
                        .context(format!("Binance API call failed for {}", key.ticker)),
                )
            } else {
                Err(anyhow::Error::new(BNKlineError::ConnectionFailed(e.to_string()))
                    .context(format!("Unexpected error during API call for {}", key.ticker)))
            }
        }
    }
}

/// Pages forward from the start date until a short page or the end date.
pub async fn load_daily_klines(key: &DataKey) -> Result<Vec<PriceBar>> {
    let rest_client = configure_binance_client()?;
    let limit = PROVIDERS.binance.klines_limit;
    let end_ms = TimeUtils::date_end_ms(key.end);
    let mut start_ms = TimeUtils::date_start_ms(key.start);
    let mut all_bars: Vec<PriceBar> = Vec::new();

    while start_ms <= end_ms {
        let params = KlinesParams::builder(key.ticker.clone(), KlinesIntervalEnum::Interval1d)
            .limit(limit)
            .start_time(Some(start_ms))
            .end_time(Some(end_ms))
            .build()?;

        let raw = fetch_klines_page(&rest_client, params, key).await?;
        let page_len = raw.len();
        let bars = convert_klines(raw)
            .map_err(|e| anyhow::Error::new(e).context(format!("{} convert failed", key.ticker)))?;

        let Some(last) = bars.last() else {
            break;
        };
        start_ms = last.timestamp_ms + TimeUtils::MS_IN_D;
        all_bars.extend(bars);

        if page_len < limit as usize {
            break;
        }
    }

    if has_duplicate_timestamp(&all_bars) {
        bail!("Duplicate kline open times for {}", key.ticker);
    }
    all_bars.retain(|b| b.timestamp_ms <= end_ms);
    Ok(all_bars)
}

fn has_duplicate_timestamp(bars: &[PriceBar]) -> bool {
    let mut seen = HashSet::new();
    bars.iter().any(|bar| !seen.insert(bar.timestamp_ms))
}

pub struct BinanceSource;

#[async_trait]
impl PriceSource for BinanceSource {
    fn signature(&self) -> &'static str {
        "Binance API"
    }

    async fn fetch_series(&self, key: &DataKey) -> Result<PriceSeries> {
        if !key.is_binance_pair() {
            bail!("{} is not a Binance spot pair", key.ticker);
        }
        let bars = load_daily_klines(key).await?;
        log::info!("{} Number of klines in Binance data is: {}", key.ticker, bars.len());
        Ok(PriceSeries::new(key.clone(), self.signature(), bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kline_conversion() {
        let raw = vec![
            KlinesItemInner::Integer(1_700_000_000_000),
            KlinesItemInner::String("100.5".to_string()),
            KlinesItemInner::String("110.0".to_string()),
            KlinesItemInner::String("99.0".to_string()),
            KlinesItemInner::String("not-a-number".to_string()),
            KlinesItemInner::String("1234.5".to_string()),
        ];
        let bar = kline_to_bar(raw).unwrap();
        assert_eq!(bar.timestamp_ms, 1_700_000_000_000);
        assert_eq!(bar.open, Some(100.5));
        assert_eq!(bar.close, None);
        assert_eq!(bar.volume, Some(1234.5));
    }

    #[test]
    fn test_kline_conversion_rejects_bad_open_time() {
        let raw = vec![KlinesItemInner::String("oops".to_string())];
        assert!(kline_to_bar(raw).is_err());
        assert!(kline_to_bar(Vec::new()).is_err());
    }

    #[test]
    fn test_duplicate_detection() {
        let a = PriceBar::new(1, 1.0, 1.0, 1.0, 1.0, 1.0);
        let b = PriceBar::new(2, 1.0, 1.0, 1.0, 1.0, 1.0);
        assert!(!has_duplicate_timestamp(&[a, b]));
        assert!(has_duplicate_timestamp(&[a, b, a]));
    }
}
