use eframe::{Frame, egui};
use poll_promise::Promise;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::INPUT_DEFAULTS;
use crate::domain::DataKey;
use crate::nn::ComputeDevice;
use crate::pipeline::{
    ForecastPipeline, ForecastReport, ForecastRequest, PipelineError, ProgressEvent, RunStage,
};
use crate::tuning::{AcquisitionKind, Trial};
use crate::ui::plot_view::PlotView;
use crate::ui::ui_panels::InputEvent;
use crate::ui::utils::setup_custom_visuals;
use crate::utils::TimeUtils;

/// Sidebar inputs. The only part of the app persisted between launches.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppInputs {
    pub ticker: String,
    /// Kept as typed so an invalid date survives a restart and stays highlighted
    pub start_text: String,
    pub end_text: String,
    pub seq_length: usize,
}

impl Default for AppInputs {
    fn default() -> Self {
        Self {
            ticker: INPUT_DEFAULTS.ticker.to_string(),
            start_text: TimeUtils::format_date(TimeUtils::days_ago(INPUT_DEFAULTS.start_days_ago)),
            end_text: TimeUtils::format_date(TimeUtils::days_ago(INPUT_DEFAULTS.end_days_ago)),
            seq_length: INPUT_DEFAULTS.seq_length,
        }
    }
}

impl AppInputs {
    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Ticker(ticker) => self.ticker = ticker.clone(),
            InputEvent::StartDate(text) => self.start_text = text.clone(),
            InputEvent::EndDate(text) => self.end_text = text.clone(),
            InputEvent::SeqLength(len) => self.seq_length = *len,
            InputEvent::Device(_) => {}
        }
    }

    /// Builds a run request, rejecting unparseable dates before anything is fetched.
    pub fn to_request(
        &self,
        device: ComputeDevice,
        prefer_api: bool,
        acquisition: AcquisitionKind,
    ) -> Result<ForecastRequest, PipelineError> {
        let start = TimeUtils::parse_date(&self.start_text).ok_or_else(|| {
            PipelineError::InvalidInput(format!("Invalid start date '{}'", self.start_text))
        })?;
        let end = TimeUtils::parse_date(&self.end_text).ok_or_else(|| {
            PipelineError::InvalidInput(format!("Invalid end date '{}'", self.end_text))
        })?;
        let request = ForecastRequest {
            key: DataKey::new(&self.ticker, start, end),
            seq_length: self.seq_length,
            device,
            prefer_api,
            acquisition,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Live state of the run in flight, written by the worker thread.
#[derive(Debug, Clone, Default)]
pub struct RunProgress {
    pub stage: Option<RunStage>,
    pub trials: Vec<Trial>,
    pub total_trials: usize,
}

impl RunProgress {
    pub fn record(&mut self, event: ProgressEvent) {
        match event {
            ProgressEvent::Stage(stage) => self.stage = Some(stage),
            ProgressEvent::Trial { trial, total } => {
                self.total_trials = total;
                self.trials.push(trial);
            }
        }
    }
}

pub(super) type RunOutcome = (ForecastRequest, Result<ForecastReport, PipelineError>);

pub struct ForecastApp {
    pub(super) egui_ctx: egui::Context,
    pub(super) inputs: AppInputs,
    pub(super) pipeline: ForecastPipeline,
    pub(super) device: ComputeDevice,
    pub(super) prefer_api: bool,
    pub(super) acquisition: AcquisitionKind,

    pub(super) run: Option<Promise<RunOutcome>>,
    pub(super) running_request: Option<ForecastRequest>,
    // Newest inputs received while a run was in flight; older ones are dropped
    pub(super) pending_request: Option<ForecastRequest>,
    pub(super) progress: Arc<Mutex<RunProgress>>,

    pub(super) report: Option<ForecastReport>,
    pub(super) last_error: Option<PipelineError>,
    pub(super) reveal_started: Option<Instant>,
    pub(super) plot_view: PlotView,
}

impl ForecastApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        pipeline: ForecastPipeline,
        device: ComputeDevice,
        prefer_api: bool,
    ) -> Self {
        let inputs = cc
            .storage
            .and_then(|storage| eframe::get_value::<AppInputs>(storage, eframe::APP_KEY))
            .unwrap_or_else(|| {
                #[cfg(debug_assertions)]
                if DEBUG_FLAGS.print_serde {
                    log::info!("No persisted inputs found. Using defaults.");
                }
                AppInputs::default()
            });

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_serde {
            log::info!("Starting with inputs {:?}", inputs);
        }

        let mut app = Self::with_inputs(cc.egui_ctx.clone(), inputs, pipeline, device, prefer_api);
        app.request_run("initial load");
        app
    }

    pub fn with_inputs(
        egui_ctx: egui::Context,
        inputs: AppInputs,
        pipeline: ForecastPipeline,
        device: ComputeDevice,
        prefer_api: bool,
    ) -> Self {
        Self {
            egui_ctx,
            inputs,
            pipeline,
            device,
            prefer_api,
            acquisition: AcquisitionKind::default(),
            run: None,
            running_request: None,
            pending_request: None,
            progress: Arc::new(Mutex::new(RunProgress::default())),
            report: None,
            last_error: None,
            reveal_started: None,
            plot_view: PlotView::new(),
        }
    }

    pub(super) fn handle_input_events(&mut self, events: Vec<InputEvent>) {
        if events.is_empty() {
            return;
        }
        for event in &events {
            if let InputEvent::Device(device) = event {
                self.device = *device;
            }
            self.inputs.apply(event);
        }
        self.request_run("input change");
    }

    /// Starts a run for the current inputs, or queues it behind the one in flight.
    pub(super) fn request_run(&mut self, reason: &str) {
        let request = match self
            .inputs
            .to_request(self.device, self.prefer_api, self.acquisition)
        {
            Ok(request) => request,
            Err(e) => {
                // Invalid inputs are shown but never run, and supersede any queued run
                self.pending_request = None;
                self.last_error = Some(e);
                return;
            }
        };

        if self.is_running() {
            // Reverting to the inputs already in flight cancels the queued run
            if self.running_request.as_ref() == Some(&request) {
                self.pending_request = None;
            } else {
                self.pending_request = Some(request);
            }
            return;
        }
        if self.last_error.is_none() && self.report.as_ref().map(|r| &r.request) == Some(&request) {
            return;
        }

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_ui_interactions {
            log::info!("Run requested ({}): {:?}", reason, request);
        }
        #[cfg(not(debug_assertions))]
        let _ = reason;

        self.start_run(request);
    }
}

impl eframe::App for ForecastApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // The worker thread finishes on its own; dropping the promise just discards its result
        self.run = None;
        self.pending_request = None;
        log::info!("Application shutdown complete.");
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.inputs);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        setup_custom_visuals(ctx);

        self.poll_run(ctx);

        let events = self.render_side_panel(ctx);
        self.handle_input_events(events);

        self.render_status_panel(ctx);
        self.render_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ohlc;
    use crate::tuning::{HyperParams, TrialPhase};
    use std::time::Duration;

    fn app(rt: &tokio::runtime::Runtime) -> ForecastApp {
        let pipeline = ForecastPipeline::new(rt.handle().clone());
        ForecastApp::with_inputs(
            egui::Context::default(),
            inputs(),
            pipeline,
            ComputeDevice::Cpu,
            false,
        )
    }

    fn current_request(app: &ForecastApp) -> ForecastRequest {
        app.inputs
            .to_request(app.device, app.prefer_api, app.acquisition)
            .unwrap()
    }

    // Marks the current inputs as the run in flight. The sender is returned so
    // the promise stays unresolved for the whole test.
    fn simulate_run_in_flight(app: &mut ForecastApp) -> poll_promise::Sender<RunOutcome> {
        let (sender, promise) = Promise::new();
        app.running_request = Some(current_request(app));
        app.run = Some(promise);
        sender
    }

    fn report_for(request: ForecastRequest) -> ForecastReport {
        let ohlc = Ohlc {
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
        };
        ForecastReport {
            request,
            source: "test".to_string(),
            n_bars: 300,
            n_rows: 267,
            best_params: HyperParams {
                hidden_dim: 10,
                num_layers: 1,
                learning_rate: 0.001,
            },
            validation_loss: 0.01,
            actual: ohlc,
            predicted: ohlc,
            trials: Vec::new(),
            validation_curve: Vec::new(),
            elapsed: Duration::from_secs(1),
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().build().unwrap()
    }

    #[test]
    fn only_newest_inputs_are_queued_during_a_run() {
        let rt = runtime();
        let mut app = app(&rt);
        let _sender = simulate_run_in_flight(&mut app);

        app.handle_input_events(vec![InputEvent::SeqLength(30)]);
        app.handle_input_events(vec![InputEvent::SeqLength(40)]);

        assert!(app.is_running());
        let queued = app.pending_request.as_ref().unwrap();
        assert_eq!(queued.seq_length, 40);
        assert_eq!(app.running_request.as_ref().unwrap().seq_length, 60);
    }

    #[test]
    fn reverting_to_running_inputs_drops_queued_run() {
        let rt = runtime();
        let mut app = app(&rt);
        let _sender = simulate_run_in_flight(&mut app);

        app.handle_input_events(vec![InputEvent::SeqLength(30)]);
        assert!(app.pending_request.is_some());

        app.handle_input_events(vec![InputEvent::SeqLength(60)]);
        assert!(app.pending_request.is_none());
        assert!(app.is_running());
    }

    #[test]
    fn invalid_input_during_run_clears_queued_run() {
        let rt = runtime();
        let mut app = app(&rt);
        let _sender = simulate_run_in_flight(&mut app);

        app.handle_input_events(vec![InputEvent::SeqLength(30)]);
        assert!(app.pending_request.is_some());

        app.handle_input_events(vec![InputEvent::StartDate("2020-02-30".to_string())]);
        assert!(app.pending_request.is_none());
        assert!(matches!(app.last_error, Some(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn unchanged_inputs_after_report_do_not_rerun() {
        let rt = runtime();
        let mut app = app(&rt);
        app.report = Some(report_for(current_request(&app)));

        app.request_run("unchanged");

        assert!(!app.is_running());
        assert!(app.running_request.is_none());
        assert!(app.pending_request.is_none());
    }

    fn inputs() -> AppInputs {
        AppInputs {
            ticker: " spy".to_string(),
            start_text: "2020-01-01".to_string(),
            end_text: "2021-01-01".to_string(),
            seq_length: 60,
        }
    }

    #[test]
    fn valid_inputs_become_request() {
        let request = inputs()
            .to_request(ComputeDevice::Cpu, false, AcquisitionKind::Ucb)
            .unwrap();
        assert_eq!(request.key.ticker, "SPY");
        assert_eq!(TimeUtils::format_date(request.key.start), "2020-01-01");
        assert_eq!(request.seq_length, 60);
    }

    #[test]
    fn invalid_date_is_rejected() {
        let mut bad = inputs();
        bad.end_text = "2021-13-40".to_string();
        let err = bad
            .to_request(ComputeDevice::Cpu, false, AcquisitionKind::Ucb)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let mut bad = inputs();
        bad.start_text = "2022-01-01".to_string();
        assert!(
            bad.to_request(ComputeDevice::Cpu, false, AcquisitionKind::Ucb)
                .is_err()
        );
    }

    #[test]
    fn events_update_inputs() {
        let mut state = inputs();
        state.apply(&InputEvent::SeqLength(30));
        state.apply(&InputEvent::Ticker("QQQ".to_string()));
        assert_eq!(state.seq_length, 30);
        assert_eq!(state.ticker, "QQQ");
    }

    #[test]
    fn persisted_inputs_fill_missing_fields_with_defaults() {
        let restored: AppInputs = serde_json::from_str(r#"{"ticker":"QQQ"}"#).unwrap();
        assert_eq!(restored.ticker, "QQQ");
        assert_eq!(restored.seq_length, INPUT_DEFAULTS.seq_length);
    }

    #[test]
    fn progress_records_stage_and_trials() {
        let mut progress = RunProgress::default();
        progress.record(ProgressEvent::Stage(RunStage::Tuning));
        progress.record(ProgressEvent::Trial {
            trial: Trial {
                index: 1,
                phase: TrialPhase::Random,
                point: [32.0, 1.0, 0.01],
                params: HyperParams {
                    hidden_dim: 32,
                    num_layers: 1,
                    learning_rate: 0.01,
                },
                score: -0.5,
                elapsed: Duration::from_millis(5),
            },
            total: 30,
        });
        assert_eq!(progress.stage, Some(RunStage::Tuning));
        assert_eq!(progress.trials.len(), 1);
        assert_eq!(progress.total_trials, 30);
    }
}
