//! Technical-analysis feature configuration

use strum_macros::{Display, EnumIter};

/// Indicators appended after the raw OHLCV columns, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum IndicatorKind {
    #[strum(to_string = "sma_20")]
    Sma20,
    #[strum(to_string = "ema_20")]
    Ema20,
    #[strum(to_string = "rsi_14")]
    Rsi14,
    #[strum(to_string = "macd")]
    Macd,
    #[strum(to_string = "macd_signal")]
    MacdSignal,
    #[strum(to_string = "bb_upper")]
    BollingerUpper,
    #[strum(to_string = "bb_lower")]
    BollingerLower,
    #[strum(to_string = "atr_14")]
    Atr14,
    #[strum(to_string = "obv")]
    Obv,
}

pub struct IndicatorPeriods {
    pub sma: usize,
    pub ema: usize,
    pub rsi: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger: usize,
    pub bollinger_k: f64,
    pub atr: usize,
}

pub struct FeatureConfig {
    /// Raw price columns, always first
    pub base_columns: &'static [&'static str],
    pub indicators: &'static [IndicatorKind],
    pub periods: IndicatorPeriods,
}

pub const FEATURES: FeatureConfig = FeatureConfig {
    base_columns: &["open", "high", "low", "close", "volume"],
    indicators: &[
        IndicatorKind::Sma20,
        IndicatorKind::Ema20,
        IndicatorKind::Rsi14,
        IndicatorKind::Macd,
        IndicatorKind::MacdSignal,
        IndicatorKind::BollingerUpper,
        IndicatorKind::BollingerLower,
        IndicatorKind::Atr14,
        IndicatorKind::Obv,
    ],
    periods: IndicatorPeriods {
        sma: 20,
        ema: 20,
        rsi: 14,
        macd_fast: 12,
        macd_slow: 26,
        macd_signal: 9,
        bollinger: 20,
        bollinger_k: 2.0,
        atr: 14,
    },
};

impl FeatureConfig {
    pub fn column_count(&self) -> usize {
        self.base_columns.len() + self.indicators.len()
    }
}
