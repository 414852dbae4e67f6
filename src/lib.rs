#![allow(clippy::const_is_empty)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod nn;
pub mod pipeline;
pub mod tuning;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use config::{INPUT_DEFAULTS, PERSISTENCE};
pub use data::fetch_price_series;
pub use domain::{DataKey, PriceBar};
pub use nn::ComputeDevice;
pub use pipeline::{ForecastPipeline, ForecastReport, ForecastRequest, PipelineError};
pub use tuning::AcquisitionKind;
pub use ui::{AppInputs, ForecastApp};

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
// CLI argument parsing
use clap::Parser;

use crate::pipeline::{ProgressEvent, report_lines};
use crate::utils::TimeUtils;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run once in the terminal instead of opening the window
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Ticker symbol (Yahoo symbol, or a Binance pair such as BTCUSDT)
    #[arg(long, default_value_t = INPUT_DEFAULTS.ticker.to_string())]
    pub ticker: String,

    /// First day of data, YYYY-MM-DD (default: five years ago)
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of data, YYYY-MM-DD (default: yesterday)
    #[arg(long)]
    pub end: Option<String>,

    /// Rows per input window
    #[arg(long, default_value_t = INPUT_DEFAULTS.seq_length)]
    pub seq_length: usize,

    #[arg(long, value_enum, default_value_t = ComputeDevice::Cpu)]
    pub device: ComputeDevice,

    /// Acquisition function used by the tuner
    #[arg(long, value_enum, default_value_t = AcquisitionKind::default())]
    pub acquisition: AcquisitionKind,

    /// Use API as primary source instead of the local cache
    #[arg(long, default_value_t = false)]
    pub prefer_api: bool,
}

impl Cli {
    /// Inputs for a headless run, with dates defaulting the same way the sidebar does.
    pub fn inputs(&self) -> AppInputs {
        let defaults = AppInputs::default();
        AppInputs {
            ticker: self.ticker.clone(),
            start_text: self.start.clone().unwrap_or(defaults.start_text),
            end_text: self.end.clone().unwrap_or(defaults.end_text),
            seq_length: self.seq_length,
        }
    }

    pub fn request(&self) -> Result<ForecastRequest, PipelineError> {
        self.inputs()
            .to_request(self.device, self.prefer_api, self.acquisition)
    }
}

/// Main application entry point - creates the GUI app
/// This is the public API for the binary to call
pub fn run_app(
    cc: &eframe::CreationContext,
    pipeline: ForecastPipeline,
    cli: &Cli,
) -> Box<dyn eframe::App> {
    let app = ui::ForecastApp::new(cc, pipeline, cli.device, cli.prefer_api);
    Box::new(app)
}

/// One pipeline run in the terminal. Progress goes to the log, the report is
/// typed to `out` one character at a time.
pub fn run_headless<W: Write>(pipeline: &ForecastPipeline, cli: &Cli, out: &mut W) -> Result<()> {
    let request = cli.request()?;
    log::info!(
        "Headless run for {} (seq length {}, {} on {})",
        request.key,
        request.seq_length,
        request.acquisition,
        request.device
    );

    let report = pipeline.run(&request, &mut |event: ProgressEvent| match event {
        ProgressEvent::Stage(stage) => log::info!("{}...", stage),
        ProgressEvent::Trial { trial, total } => log::info!(
            "Trial {}/{}: hidden={} layers={} lr={:.5} loss={:.5}",
            trial.index,
            total,
            trial.params.hidden_dim,
            trial.params.num_layers,
            trial.params.learning_rate,
            -trial.score
        ),
    })?;

    log::info!(
        "Data from {} ({} bars) ending {}",
        report.source,
        report.n_bars,
        TimeUtils::format_date(report.request.key.end)
    );
    let delay = Duration::from_secs_f64(INPUT_DEFAULTS.typing_speed_secs);
    ui::reveal_lines(out, &report_lines(&report), delay).context("Failed to write report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_sidebar_defaults() {
        let cli = Cli::parse_from(["lstm-tuner"]);
        assert!(!cli.headless);
        assert_eq!(cli.ticker, "SPY");
        assert_eq!(cli.seq_length, 60);
        assert_eq!(cli.device, ComputeDevice::Cpu);
        assert_eq!(cli.inputs(), AppInputs::default());
    }

    #[test]
    fn cli_flags_flow_into_request() {
        let cli = Cli::parse_from([
            "lstm-tuner",
            "--headless",
            "--ticker",
            "btcusdt",
            "--start",
            "2023-01-01",
            "--end",
            "2024-01-01",
            "--seq-length",
            "30",
            "--acquisition",
            "ei",
            "--prefer-api",
        ]);
        let request = cli.request().unwrap();
        assert!(cli.headless);
        assert_eq!(request.key.ticker, "BTCUSDT");
        assert_eq!(request.seq_length, 30);
        assert_eq!(request.acquisition, AcquisitionKind::Ei);
        assert!(request.prefer_api);
    }

    #[test]
    fn zero_seq_length_is_rejected_before_running() {
        let cli = Cli::parse_from(["lstm-tuner", "--seq-length", "0"]);
        assert!(matches!(cli.request(), Err(PipelineError::InvalidInput(_))));
    }
}
