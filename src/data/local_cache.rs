use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::PERSISTENCE;
use crate::data::cache_file::CacheFile;
use crate::data::price_source::PriceSource;
use crate::domain::DataKey;
use crate::models::PriceSeries;
use crate::utils::time_utils::how_many_seconds_ago;

/// Rejects a cache written by another format version, for another key, or too long ago.
pub fn check_cache_validity(
    cache: &CacheFile,
    key: &DataKey,
    version_required: f64,
    recency_required_secs: i64,
) -> Result<()> {
    // Check version
    if cache.version != version_required {
        bail!(
            "Cache version mismatch: file v{} vs required v{}",
            cache.version,
            version_required
        );
    }

    // Check key matches (filenames could collide after manual renames)
    if &cache.key != key {
        bail!("Cache key mismatch: file has {}, expected {}", cache.key, key);
    }

    // Check recency
    let seconds_ago = how_many_seconds_ago(cache.timestamp_ms);
    if seconds_ago > recency_required_secs {
        bail!(
            "Cache too old: created {} seconds ago (limit: {} seconds)",
            seconds_ago,
            recency_required_secs
        );
    }
    Ok(())
}

pub fn check_local_data_validity(key: &DataKey) -> Result<()> {
    let full_path = CacheFile::default_cache_path(key);

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!("Checking validity of local cache at {:?}...", full_path);
    }
    let cache = CacheFile::load_from_path(&full_path)?;
    check_cache_validity(
        &cache,
        key,
        PERSISTENCE.price_cache.version,
        PERSISTENCE.price_cache.acceptable_age_secs,
    )?;

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_serde {
        log::info!(
            "✅ Cache valid: v{}, {} bars for {}",
            cache.version,
            cache.series.len(),
            key
        );
    }
    Ok(())
}

/// Write a freshly fetched series to its binary cache file.
pub fn write_series_locally(series: &PriceSeries) -> Result<()> {
    let full_path = CacheFile::default_cache_path(&series.key);

    #[cfg(debug_assertions)]
    let start_time = DEBUG_FLAGS.print_serde.then(|| {
        log::info!("Writing cache to disk: {:?}...", full_path);
        std::time::Instant::now()
    });

    let cache = CacheFile::new(series.clone(), PERSISTENCE.price_cache.version);
    cache.save_to_path(&full_path)?;

    #[cfg(debug_assertions)]
    if let Some(start) = start_time {
        log::info!(
            "✅ Cache written: {} bars in {:.3}s",
            series.len(),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

/// Async wrapper for write_series_locally.
/// Spawns a blocking task so the caller is not held up by disk I/O.
pub async fn write_series_async(series: PriceSeries) -> Result<()> {
    tokio::task::spawn_blocking(move || write_series_locally(&series))
        .await
        .context("Cache write task panicked")?
}

pub struct LocalCacheSource;

#[async_trait]
impl PriceSource for LocalCacheSource {
    fn signature(&self) -> &'static str {
        "Local Cache"
    }

    async fn fetch_series(&self, key: &DataKey) -> Result<PriceSeries> {
        let full_path: PathBuf = CacheFile::default_cache_path(key);

        #[cfg(debug_assertions)]
        let start_time = DEBUG_FLAGS.print_serde.then(|| {
            log::info!("Reading cache from: {:?}...", full_path);
            std::time::Instant::now()
        });

        let cache = tokio::task::spawn_blocking(move || CacheFile::load_from_path(&full_path))
            .await
            .context("Deserialization task panicked")?
            .context("Failed to load cache file")?;
        check_cache_validity(
            &cache,
            key,
            PERSISTENCE.price_cache.version,
            PERSISTENCE.price_cache.acceptable_age_secs,
        )?;

        #[cfg(debug_assertions)]
        if let Some(start) = start_time {
            log::info!(
                "✅ Cache loaded: {} bars in {:.3}s",
                cache.series.len(),
                start.elapsed().as_secs_f64()
            );
        }

        Ok(cache.series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;
    use crate::utils::TimeUtils;
    use chrono::NaiveDate;

    fn key(ticker: &str) -> DataKey {
        DataKey::new(
            ticker,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    fn cache_for(key: &DataKey) -> CacheFile {
        let series = PriceSeries::new(
            key.clone(),
            "test",
            vec![PriceBar::new(0, 1.0, 1.0, 1.0, 1.0, 1.0)],
        );
        CacheFile::new(series, 1.0)
    }

    #[test]
    fn test_fresh_matching_cache_is_valid() {
        let k = key("SPY");
        assert!(check_cache_validity(&cache_for(&k), &k, 1.0, 60).is_ok());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let k = key("SPY");
        assert!(check_cache_validity(&cache_for(&k), &k, 2.0, 60).is_err());
    }

    #[test]
    fn test_key_mismatch_rejected() {
        let k = key("SPY");
        assert!(check_cache_validity(&cache_for(&k), &key("QQQ"), 1.0, 60).is_err());
    }

    #[test]
    fn test_stale_cache_rejected() {
        let k = key("SPY");
        let mut cache = cache_for(&k);
        cache.timestamp_ms -= 2 * TimeUtils::MS_IN_D;
        assert!(check_cache_validity(&cache, &k, 1.0, 86_400).is_err());
    }
}
