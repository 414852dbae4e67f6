use serde::{Deserialize, Serialize};

/// One daily bar as delivered by a provider.
/// Any field may be missing (providers report gaps as nulls); the feature
/// builder drops incomplete bars.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub timestamp_ms: i64, // only necessary field. All others are optional
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceBar {
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp_ms,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }

    /// The bar's five values, or `None` if any is missing or non-finite.
    pub fn complete(&self) -> Option<CompleteBar> {
        let bar = CompleteBar {
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume?,
        };
        bar.is_finite().then_some(bar)
    }
}

/// A bar with every field present. Implements the `ta` input traits so it can
/// feed bar-based indicators (ATR, OBV) directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompleteBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl CompleteBar {
    fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn values(&self) -> [f64; 5] {
        [self.open, self.high, self.low, self.close, self.volume]
    }
}

impl ta::Open for CompleteBar {
    fn open(&self) -> f64 {
        self.open
    }
}

impl ta::High for CompleteBar {
    fn high(&self) -> f64 {
        self.high
    }
}

impl ta::Low for CompleteBar {
    fn low(&self) -> f64 {
        self.low
    }
}

impl ta::Close for CompleteBar {
    fn close(&self) -> f64 {
        self.close
    }
}

impl ta::Volume for CompleteBar {
    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Open/High/Low/Close in original price units, used for display.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlc {
    /// Reads the first four values of a feature row (canonical layout puts OHLC first).
    pub fn from_row(row: &[f64]) -> Option<Self> {
        match row {
            [open, high, low, close, ..] => Some(Self {
                open: *open,
                high: *high,
                low: *low,
                close: *close,
            }),
            _ => None,
        }
    }
}
