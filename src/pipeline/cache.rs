use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::domain::DataKey;
use crate::models::FeatureMatrix;
use crate::pipeline::error::PipelineError;

/// Engineered features for one key, plus where the bars came from.
#[derive(Debug, Clone)]
pub struct CachedFeatures {
    pub source: String,
    pub n_bars: usize,
    pub matrix: FeatureMatrix,
}

/// Session-lifetime memo of fetch + feature results, keyed by the exact
/// (ticker, start, end). Cloning shares the same map. Never evicted.
#[derive(Debug, Clone, Default)]
pub struct FeatureCache {
    entries: Arc<Mutex<HashMap<DataKey, Arc<CachedFeatures>>>>,
}

impl FeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &DataKey) -> Option<Arc<CachedFeatures>> {
        let map = self.entries.lock().ok()?;
        map.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached entry or builds it with `build`. The lock is not held
    /// while building, so a slow fetch never blocks readers. Failures are not cached.
    pub fn get_or_build<F>(&self, key: &DataKey, build: F) -> Result<Arc<CachedFeatures>, PipelineError>
    where
        F: FnOnce() -> Result<CachedFeatures, PipelineError>,
    {
        if let Some(hit) = self.get(key) {
            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_cache_events {
                log::info!("Feature cache hit for {}", key);
            }
            return Ok(hit);
        }

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_cache_events {
            log::info!("Feature cache miss for {}", key);
        }

        let built = Arc::new(build()?);
        let mut map = self
            .entries
            .lock()
            .map_err(|_| PipelineError::Failed("Feature cache lock poisoned".to_string()))?;
        let entry = map.entry(key.clone()).or_insert(built);
        Ok(Arc::clone(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn key(ticker: &str) -> DataKey {
        DataKey::new(
            ticker,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    fn entry() -> CachedFeatures {
        CachedFeatures {
            source: "test".to_string(),
            n_bars: 1,
            matrix: FeatureMatrix::new(vec!["a".into()], vec![1.0]).unwrap(),
        }
    }

    #[test]
    fn test_builds_once_per_key() {
        let cache = FeatureCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            cache
                .get_or_build(&key("SPY"), || {
                    builds += 1;
                    Ok(entry())
                })
                .unwrap();
        }
        assert_eq!(builds, 1);

        cache.get_or_build(&key("QQQ"), || Ok(entry())).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failures_not_cached() {
        let cache = FeatureCache::new();
        let err = cache.get_or_build(&key("BAD"), || Err(PipelineError::NoData("none".into())));
        assert!(err.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = FeatureCache::new();
        let shared = cache.clone();
        cache.get_or_build(&key("SPY"), || Ok(entry())).unwrap();
        assert!(shared.get(&key("SPY")).is_some());
    }
}
