use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use crate::domain::DataKey;
use crate::models::PriceSeries;

#[async_trait]
pub trait PriceSource: Send + Sync {
    // Either fetch a price series for `key` OR return an anyhow::error
    async fn fetch_series(&self, key: &DataKey) -> Result<PriceSeries>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

/// Tries each source in order and returns the first non-empty series.
/// An empty series counts as a failure so the next source gets a chance.
pub async fn get_price_series_async(
    sources: &[Box<dyn PriceSource>],
    key: &DataKey,
) -> Result<(PriceSeries, &'static str)> {
    let mut failures = Vec::new();
    for source in sources {
        let outcome = match source.fetch_series(key).await {
            Ok(series) if series.is_empty() => Err(anyhow!("returned zero bars")),
            other => other,
        };
        match outcome {
            Ok(series) => return Ok((series, source.signature())),
            Err(e) => {
                log::info!("{} failed for {}: {:#}", source.signature(), key, e);
                failures.push(format!("{}: {:#}", source.signature(), e));
                // Continue to the next source
            }
        }
    }
    if failures.is_empty() {
        bail!("No price sources configured for {}", key);
    }
    Err(anyhow!(
        "All price sources failed for {} ({})",
        key,
        failures.join("; ")
    ))
}
