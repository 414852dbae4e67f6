use anyhow::{Result, anyhow};
use ta::Next;
use ta::indicators::{
    AverageTrueRange, BollingerBands, ExponentialMovingAverage, MovingAverageConvergenceDivergence,
    OnBalanceVolume, RelativeStrengthIndex, SimpleMovingAverage,
};

use crate::config::FEATURES;
use crate::config::IndicatorKind;
use crate::config::features::IndicatorPeriods;
use crate::domain::price_bar::CompleteBar;
use crate::models::{FeatureMatrix, PriceSeries};

/// Number of leading bars for which `kind` has no meaningful value.
pub fn warm_up(kind: IndicatorKind, periods: &IndicatorPeriods) -> usize {
    match kind {
        IndicatorKind::Sma20 => periods.sma - 1,
        IndicatorKind::Ema20 => periods.ema - 1,
        IndicatorKind::Rsi14 => periods.rsi,
        IndicatorKind::Macd => periods.macd_slow - 1,
        IndicatorKind::MacdSignal => periods.macd_slow + periods.macd_signal - 2,
        IndicatorKind::BollingerUpper | IndicatorKind::BollingerLower => periods.bollinger - 1,
        IndicatorKind::Atr14 => periods.atr,
        IndicatorKind::Obv => 0,
    }
}

// One stateful ta indicator per family; MACD and Bollinger each feed two columns.
struct IndicatorState {
    sma: SimpleMovingAverage,
    ema: ExponentialMovingAverage,
    rsi: RelativeStrengthIndex,
    macd: MovingAverageConvergenceDivergence,
    bollinger: BollingerBands,
    atr: AverageTrueRange,
    obv: OnBalanceVolume,
}

struct IndicatorValues {
    sma: f64,
    ema: f64,
    rsi: f64,
    macd: f64,
    macd_signal: f64,
    bb_upper: f64,
    bb_lower: f64,
    atr: f64,
    obv: f64,
}

impl IndicatorValues {
    fn get(&self, kind: IndicatorKind) -> f64 {
        match kind {
            IndicatorKind::Sma20 => self.sma,
            IndicatorKind::Ema20 => self.ema,
            IndicatorKind::Rsi14 => self.rsi,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::MacdSignal => self.macd_signal,
            IndicatorKind::BollingerUpper => self.bb_upper,
            IndicatorKind::BollingerLower => self.bb_lower,
            IndicatorKind::Atr14 => self.atr,
            IndicatorKind::Obv => self.obv,
        }
    }
}

impl IndicatorState {
    fn new(p: &IndicatorPeriods) -> Result<Self> {
        let bad = |e| anyhow!("Invalid indicator period: {:?}", e);
        Ok(Self {
            sma: SimpleMovingAverage::new(p.sma).map_err(bad)?,
            ema: ExponentialMovingAverage::new(p.ema).map_err(bad)?,
            rsi: RelativeStrengthIndex::new(p.rsi).map_err(bad)?,
            macd: MovingAverageConvergenceDivergence::new(p.macd_fast, p.macd_slow, p.macd_signal)
                .map_err(bad)?,
            bollinger: BollingerBands::new(p.bollinger, p.bollinger_k).map_err(bad)?,
            atr: AverageTrueRange::new(p.atr).map_err(bad)?,
            obv: OnBalanceVolume::new(),
        })
    }

    fn next(&mut self, bar: &CompleteBar) -> IndicatorValues {
        let macd = self.macd.next(bar.close);
        let bands = self.bollinger.next(bar.close);
        IndicatorValues {
            sma: self.sma.next(bar.close),
            ema: self.ema.next(bar.close),
            rsi: self.rsi.next(bar.close),
            macd: macd.macd,
            macd_signal: macd.signal,
            bb_upper: bands.upper,
            bb_lower: bands.lower,
            atr: self.atr.next(bar),
            obv: self.obv.next(bar),
        }
    }
}

/// Builds the canonical feature matrix: raw OHLCV first, then the configured
/// indicators. Incomplete bars are skipped before the indicators see them;
/// rows inside any indicator's warm-up, or with a non-finite value, are dropped.
pub fn build_features(series: &PriceSeries) -> Result<FeatureMatrix> {
    build_features_with(series, FEATURES.indicators, &FEATURES.periods)
}

pub fn build_features_with(
    series: &PriceSeries,
    indicators: &[IndicatorKind],
    periods: &IndicatorPeriods,
) -> Result<FeatureMatrix> {
    let columns: Vec<String> = FEATURES
        .base_columns
        .iter()
        .map(|c| c.to_string())
        .chain(indicators.iter().map(|i| i.to_string()))
        .collect();

    let skip = indicators
        .iter()
        .map(|&k| warm_up(k, periods))
        .max()
        .unwrap_or(0);

    let mut state = IndicatorState::new(periods)?;
    let mut data = Vec::with_capacity(series.len() * columns.len());
    let mut row = Vec::with_capacity(columns.len());

    for (idx, bar) in series.bars.iter().filter_map(|b| b.complete()).enumerate() {
        let values = state.next(&bar);
        if idx < skip {
            continue;
        }
        row.clear();
        row.extend(bar.values());
        row.extend(indicators.iter().map(|&k| values.get(k)));
        if row.iter().all(|v| v.is_finite()) {
            data.extend_from_slice(&row);
        }
    }

    let matrix = FeatureMatrix::new(columns, data)?;
    log::info!(
        "Built {} feature rows x {} columns from {} bars for {}",
        matrix.n_rows(),
        matrix.n_cols(),
        series.len(),
        series.key.ticker
    );
    Ok(matrix)
}
