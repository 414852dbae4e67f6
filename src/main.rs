use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use eframe::NativeOptions;
use tokio::runtime::Runtime;

use lstm_tuner::{Cli, ForecastPipeline, PERSISTENCE, run_app, run_headless};

fn main() -> Result<()> {
    // A. Init Logging
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Runtime for provider calls and background cache writes
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let pipeline = ForecastPipeline::new(rt.handle().clone());

    // D. Headless: one run, report to stdout
    if args.headless {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let result = run_headless(&pipeline, &args, &mut out).inspect_err(|e| {
            log::error!("Run failed: {:#}", e);
        });
        // Let an in-flight cache write finish
        rt.shutdown_timeout(Duration::from_secs(5));
        return result;
    }

    // E. Run Native App
    let options = NativeOptions {
        persistence_path: Some(PathBuf::from(PERSISTENCE.app_state_path)),
        ..Default::default()
    };

    eframe::run_native(
        lstm_tuner::ui::config::UI_TEXT.app_title,
        options,
        Box::new(move |cc| Ok(run_app(cc, pipeline, &args))),
    )
    .map_err(|e| anyhow!("GUI exited with an error: {}", e))
}
