//! Yahoo Finance daily chart provider.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::PROVIDERS;
use crate::data::price_source::PriceSource;
use crate::domain::{DataKey, PriceBar};
use crate::models::PriceSeries;
use crate::utils::TimeUtils;

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    // Absent when the range holds no trading days
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Turns a chart response body into bars. Null quote entries become gaps.
pub fn parse_chart_response(body: &str) -> Result<Vec<PriceBar>> {
    let response: YahooResponse =
        serde_json::from_str(body).context("Failed to parse Yahoo chart response")?;

    if let Some(error) = response.chart.error {
        bail!("Yahoo Finance error: {} - {}", error.code, error.description);
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("Yahoo Finance returned no result"))?;

    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();
    let bars = timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts_secs)| PriceBar {
            timestamp_ms: ts_secs * TimeUtils::MS_IN_S,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close: at(&quote.close, i),
            volume: at(&quote.volume, i),
        })
        .collect();
    Ok(bars)
}

pub struct YahooSource {
    client: Client,
}

impl YahooSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(PROVIDERS.yahoo.timeout_ms))
            .user_agent(PROVIDERS.yahoo.user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PriceSource for YahooSource {
    fn signature(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn fetch_series(&self, key: &DataKey) -> Result<PriceSeries> {
        let url = format!("{}/{}", PROVIDERS.yahoo.chart_url, key.ticker);
        // period2 is exclusive, so push it past the end date to keep that day
        let period1 = TimeUtils::date_start_ms(key.start) / TimeUtils::MS_IN_S;
        let period2 = (TimeUtils::date_end_ms(key.end) + 1) / TimeUtils::MS_IN_S;

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .context(format!("Yahoo request failed for {}", key.ticker))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read Yahoo response body")?;
        if !status.is_success() && !body.contains("\"chart\"") {
            bail!("Yahoo Finance returned HTTP {} for {}", status, key.ticker);
        }

        let bars = parse_chart_response(&body)?;
        Ok(PriceSeries::new(key.clone(), self.signature(), bars))
    }
}
