use eframe::egui;
use poll_promise::Promise;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::pipeline::{ForecastPipeline, ForecastRequest, ProgressEvent};
use crate::ui::app::{ForecastApp, RunOutcome, RunProgress};

// How often to poll the worker when nothing else asks for a repaint
const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl ForecastApp {
    pub(super) fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub(super) fn start_run(&mut self, request: ForecastRequest) {
        if self.is_running() {
            self.pending_request = Some(request);
            return;
        }

        self.progress = Arc::new(Mutex::new(RunProgress::default()));
        self.last_error = None;
        self.running_request = Some(request.clone());

        let pipeline = self.pipeline.clone();
        let progress = Arc::clone(&self.progress);
        let ctx = self.egui_ctx.clone();

        let promise = Promise::spawn_thread("forecast_run", move || {
            run_forecast(pipeline, request, progress, ctx)
        });
        self.run = Some(promise);
    }

    pub(super) fn poll_run(&mut self, ctx: &egui::Context) {
        let Some(promise) = self.run.take() else {
            return;
        };
        let (request, result) = match promise.try_take() {
            Ok(outcome) => outcome,
            Err(promise) => {
                self.run = Some(promise);
                ctx.request_repaint_after(POLL_INTERVAL);
                return;
            }
        };
        self.running_request = None;

        match result {
            Ok(report) => {
                log::info!(
                    "Run for {} finished in {:.1}s (validation loss {:.4})",
                    request.key,
                    report.elapsed.as_secs_f64(),
                    report.validation_loss
                );
                self.plot_view.set_curve(&report.validation_curve);
                self.report = Some(report);
                self.last_error = None;
                self.reveal_started = Some(Instant::now());
            }
            Err(e) => {
                log::error!("Run for {} failed: {}", request.key, e);
                // Failed runs render nothing downstream
                self.report = None;
                self.plot_view.clear();
                self.reveal_started = None;
                self.last_error = Some(e);
            }
        }

        if let Some(next) = self.pending_request.take() {
            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_ui_interactions {
                log::info!("Starting queued run for {}", next.key);
            }
            self.start_run(next);
        }
        ctx.request_repaint();
    }

    pub(super) fn progress_snapshot(&self) -> RunProgress {
        self.progress
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

fn run_forecast(
    pipeline: ForecastPipeline,
    request: ForecastRequest,
    progress: Arc<Mutex<RunProgress>>,
    ctx: egui::Context,
) -> RunOutcome {
    let result = pipeline.run(&request, &mut |event: ProgressEvent| {
        if let Ok(mut p) = progress.lock() {
            p.record(event);
        }
        ctx.request_repaint();
    });
    (request, result)
}
