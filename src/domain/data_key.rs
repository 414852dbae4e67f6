use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::PROVIDERS;

/// Identifies one fetch: ticker plus inclusive date range.
/// This is the memoization key for fetched prices and engineered features.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct DataKey {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DataKey {
    /// Builds a key with the ticker trimmed and upper-cased so "spy " and "SPY"
    /// share a cache entry.
    pub fn new(ticker: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            start,
            end,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.ticker.is_empty() {
            return Err("Ticker must not be empty".to_string());
        }
        if self.ticker.chars().any(char::is_whitespace) {
            return Err(format!("Ticker '{}' contains whitespace", self.ticker));
        }
        if self.start >= self.end {
            return Err(format!(
                "Start date {} must be before end date {}",
                self.start, self.end
            ));
        }
        Ok(())
    }

    // Finds the quote asset at the end of the ticker, if it looks like a Binance pair.
    pub fn binance_quote(&self) -> Option<&str> {
        PROVIDERS
            .binance
            .quote_assets
            .iter()
            .find(|&&quote| self.ticker.len() > quote.len() && self.ticker.ends_with(quote))
            .copied()
    }

    pub fn is_binance_pair(&self) -> bool {
        self.binance_quote().is_some()
    }
}

impl std::fmt::Display for DataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} [{} → {}]", self.ticker, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ticker_normalised() {
        let a = DataKey::new(" spy ", date(2020, 1, 1), date(2021, 1, 1));
        let b = DataKey::new("SPY", date(2020, 1, 1), date(2021, 1, 1));
        assert_eq!(a, b);
        assert_eq!(a.ticker, "SPY");
    }

    #[test]
    fn test_validate() {
        assert!(DataKey::new("SPY", date(2020, 1, 1), date(2021, 1, 1)).validate().is_ok());
        assert!(DataKey::new("", date(2020, 1, 1), date(2021, 1, 1)).validate().is_err());
        assert!(DataKey::new("SPY", date(2021, 1, 1), date(2021, 1, 1)).validate().is_err());
        assert!(DataKey::new("S P", date(2020, 1, 1), date(2021, 1, 1)).validate().is_err());
    }

    #[test]
    fn test_binance_detection() {
        let btc = DataKey::new("btcusdt", date(2020, 1, 1), date(2021, 1, 1));
        assert_eq!(btc.binance_quote(), Some("USDT"));
        let spy = DataKey::new("SPY", date(2020, 1, 1), date(2021, 1, 1));
        assert!(!spy.is_binance_pair());
        // A bare quote asset is not a pair
        let usdt = DataKey::new("USDT", date(2020, 1, 1), date(2021, 1, 1));
        assert!(!usdt.is_binance_pair());
    }
}
