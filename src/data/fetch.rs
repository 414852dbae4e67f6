// Provider selection for one fetch, run from the pipeline thread via Handle::block_on

use anyhow::Result;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::data::binance::BinanceSource;
use crate::data::local_cache::{LocalCacheSource, check_local_data_validity, write_series_async};
use crate::data::price_source::{PriceSource, get_price_series_async};
use crate::data::yahoo::YahooSource;
use crate::domain::DataKey;
use crate::models::PriceSeries;
use crate::utils::time_utils::epoch_ms_to_utc;

/// Builds the ordered provider list for `key`.
/// A valid local cache goes first unless `prefer_api` is set. Binance pairs try
/// Binance before Yahoo.
pub fn build_sources(key: &DataKey, prefer_api: bool) -> Result<Vec<Box<dyn PriceSource>>> {
    let mut network: Vec<Box<dyn PriceSource>> = Vec::new();
    if key.is_binance_pair() {
        network.push(Box::new(BinanceSource));
        network.push(Box::new(YahooSource::new()?));
    } else {
        network.push(Box::new(YahooSource::new()?));
    }

    let sources = match (prefer_api, check_local_data_validity(key)) {
        (false, Ok(_)) => {
            let mut s: Vec<Box<dyn PriceSource>> = vec![Box::new(LocalCacheSource)];
            s.extend(network);
            s
        } // local first
        (true, Ok(_)) => {
            network.push(Box::new(LocalCacheSource));
            network
        } // API first
        (_, Err(e)) => {
            log::info!("Local cache unavailable for {}: {:#}", key, e);
            network // API only
        }
    };
    Ok(sources)
}

/// Fetches daily bars for `key`. Fresh network data is written to the local
/// cache in the background.
pub async fn fetch_price_series(key: &DataKey, prefer_api: bool) -> Result<PriceSeries> {
    let sources = build_sources(key, prefer_api)?;
    let (series, signature) = get_price_series_async(&sources, key).await?;

    log::info!(
        "Fetched {} bars for {} using {} ({} to {}, {:.2}% gaps)",
        series.len(),
        key,
        signature,
        series.first_timestamp_ms().map(epoch_ms_to_utc).unwrap_or_default(),
        series.last_timestamp_ms().map(epoch_ms_to_utc).unwrap_or_default(),
        series.pct_gaps()
    );

    if signature != LocalCacheSource.signature() {
        let to_write = series.clone();
        tokio::spawn(async move {
            if let Err(e) = write_series_async(to_write).await {
                log::warn!("⚠️  Failed to write price cache: {:#}", e);
            }
        });
    }

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!("Data fetch complete.");
    }
    Ok(series)
}
