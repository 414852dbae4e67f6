use serde::{Deserialize, Serialize};

use crate::domain::{DataKey, PriceBar};

// ============================================================================
// PriceSeries: ordered daily bars for one ticker, immutable once fetched
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub key: DataKey,
    /// Which provider produced the bars (e.g. "Yahoo Finance").
    pub source: String,
    /// Oldest first.
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(key: DataKey, source: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.timestamp_ms);
        bars.dedup_by_key(|b| b.timestamp_ms);
        Self {
            key,
            source: source.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_timestamp_ms(&self) -> Option<i64> {
        self.bars.first().map(|b| b.timestamp_ms)
    }

    pub fn last_timestamp_ms(&self) -> Option<i64> {
        self.bars.last().map(|b| b.timestamp_ms)
    }

    /// Share of bars with at least one missing value, in percent.
    pub fn pct_gaps(&self) -> f64 {
        if self.bars.is_empty() {
            return 0.0;
        }
        let gaps = self.bars.iter().filter(|b| b.complete().is_none()).count();
        gaps as f64 * 100.0 / self.bars.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_bars_sorted_and_deduplicated() {
        let key = DataKey::new(
            "SPY",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        );
        let bars = vec![
            PriceBar::new(3, 1.0, 1.0, 1.0, 1.0, 1.0),
            PriceBar::new(1, 1.0, 1.0, 1.0, 1.0, 1.0),
            PriceBar::new(3, 2.0, 2.0, 2.0, 2.0, 2.0),
        ];
        let series = PriceSeries::new(key, "test", bars);
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_timestamp_ms(), Some(1));
        assert_eq!(series.last_timestamp_ms(), Some(3));
    }
}
