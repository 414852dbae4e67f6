use std::path::PathBuf;
use std::time::{Duration, Instant};

use candle_core::Device;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tokio::runtime::Handle;

use crate::analysis::{NormalizedSplit, SequenceSet, build_features, create_sequences, normalize_split};
use crate::config::tuner::TunerConfig;
use crate::config::{PERSISTENCE, TRAINING, TUNER};
use crate::data::fetch_price_series;
use crate::domain::{DataKey, Ohlc};
use crate::models::FeatureMatrix;
use crate::nn::trainer::{predict_all, predict_next};
use crate::nn::{ComputeDevice, ModelConfig, load_weights, model_loss, save_weights, train_model};
use crate::pipeline::cache::{CachedFeatures, FeatureCache};
use crate::pipeline::error::PipelineError;
use crate::tuning::{AcquisitionKind, BayesianOptimizer, HyperParams, Trial};

/// One run's inputs, as set in the sidebar or on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub key: DataKey,
    pub seq_length: usize,
    pub device: ComputeDevice,
    pub prefer_api: bool,
    pub acquisition: AcquisitionKind,
}

impl ForecastRequest {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.key.validate().map_err(PipelineError::InvalidInput)?;
        if self.seq_length == 0 {
            return Err(PipelineError::InvalidInput(
                "Sequence length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RunStage {
    #[strum(to_string = "Fetching prices")]
    Fetching,
    #[strum(to_string = "Preparing sequences")]
    Preparing,
    #[strum(to_string = "Tuning hyperparameters")]
    Tuning,
    #[strum(to_string = "Training final model")]
    FinalTraining,
    #[strum(to_string = "Predicting")]
    Predicting,
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Stage(RunStage),
    Trial { trial: Trial, total: usize },
}

/// Close price of one validation target next to the model's one-step prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationPoint {
    pub index: usize,
    pub actual_close: f64,
    pub predicted_close: f64,
}

#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub request: ForecastRequest,
    pub source: String,
    pub n_bars: usize,
    pub n_rows: usize,
    pub best_params: HyperParams,
    /// MSE of the final (retrained) model on the validation sequences, scaled units
    pub validation_loss: f64,
    pub actual: Ohlc,
    pub predicted: Ohlc,
    pub trials: Vec<Trial>,
    pub validation_curve: Vec<ValidationPoint>,
    pub elapsed: Duration,
}

/// Runs forecasts against a shared feature cache. Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct ForecastPipeline {
    cache: FeatureCache,
    runtime: Handle,
    tuner: &'static TunerConfig,
    epochs: usize,
    weights_path: PathBuf,
}

const CLOSE_COLUMN: usize = 3;

struct Prepared {
    split: NormalizedSplit,
    train: SequenceSet,
    valid: SequenceSet,
}

fn prepare(matrix: &FeatureMatrix, seq_length: usize) -> Result<Prepared, PipelineError> {
    if matrix.is_empty() {
        return Err(PipelineError::InsufficientRows(
            "no complete rows after feature engineering".to_string(),
        ));
    }
    let split = normalize_split(matrix).map_err(PipelineError::from_anyhow)?;
    let train = create_sequences(&split.train_scaled, seq_length);
    let valid = create_sequences(&split.valid_scaled, seq_length);
    if train.is_empty() || valid.is_empty() {
        return Err(PipelineError::InsufficientRows(format!(
            "{} training rows and {} validation rows cannot fill a window of {} plus a target",
            split.train_scaled.n_rows(),
            split.valid_scaled.n_rows(),
            seq_length
        )));
    }
    Ok(Prepared { split, train, valid })
}

impl ForecastPipeline {
    pub fn new(runtime: Handle) -> Self {
        Self {
            cache: FeatureCache::new(),
            runtime,
            tuner: &TUNER,
            epochs: TRAINING.epochs,
            weights_path: PathBuf::from(PERSISTENCE.weights_path),
        }
    }

    pub fn cache(&self) -> &FeatureCache {
        &self.cache
    }

    pub fn with_weights_path(mut self, path: PathBuf) -> Self {
        self.weights_path = path;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_tuner(mut self, tuner: &'static TunerConfig) -> Self {
        self.tuner = tuner;
        self
    }

    fn load_features(&self, request: &ForecastRequest) -> Result<std::sync::Arc<CachedFeatures>, PipelineError> {
        self.cache.get_or_build(&request.key, || {
            let series = self
                .runtime
                .block_on(fetch_price_series(&request.key, request.prefer_api))
                .map_err(|e| PipelineError::NoData(format!("{:#}", e)))?;
            if series.is_empty() {
                return Err(PipelineError::NoData(format!(
                    "no bars for {}",
                    request.key
                )));
            }
            let matrix = build_features(&series).map_err(PipelineError::from_anyhow)?;
            Ok(CachedFeatures {
                source: series.source.clone(),
                n_bars: series.len(),
                matrix,
            })
        })
    }

    /// Full run for `request`. `on_progress` is called from the calling thread
    /// as stages start and trials finish.
    pub fn run(
        &self,
        request: &ForecastRequest,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<ForecastReport, PipelineError> {
        let started = Instant::now();
        request.validate()?;

        on_progress(ProgressEvent::Stage(RunStage::Fetching));
        let features = self.load_features(request)?;

        on_progress(ProgressEvent::Stage(RunStage::Preparing));
        self.run_on_features(request, &features, started, on_progress)
    }

    fn run_on_features(
        &self,
        request: &ForecastRequest,
        features: &CachedFeatures,
        started: Instant,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<ForecastReport, PipelineError> {
        let seq_length = request.seq_length;
        let prepared = prepare(&features.matrix, seq_length)?;
        let n_features = features.matrix.n_cols();
        let device = request
            .device
            .to_candle()
            .map_err(|e| PipelineError::Failed(e.to_string()))?;

        log::info!(
            "{}: {} rows ({} train / {} valid), {} train and {} valid sequences of length {}",
            request.key,
            features.matrix.n_rows(),
            prepared.split.train_scaled.n_rows(),
            prepared.split.valid_scaled.n_rows(),
            prepared.train.len(),
            prepared.valid.len(),
            seq_length
        );

        on_progress(ProgressEvent::Stage(RunStage::Tuning));
        let epochs = self.epochs;
        let objective = |p: &HyperParams| -> anyhow::Result<f64> {
            let config = ModelConfig::new(n_features, p.hidden_dim, p.num_layers);
            let trained = train_model(config, p.learning_rate, epochs, &prepared.train, &device)?;
            let valid_loss = checked_valid_loss(&trained, &prepared.valid, &device, p)?;
            Ok(-valid_loss)
        };
        let mut optimizer = BayesianOptimizer::new(self.tuner, request.acquisition);
        let total = optimizer.total_trials();
        let tuned = optimizer
            .maximize(objective, |trial| {
                on_progress(ProgressEvent::Trial {
                    trial: trial.clone(),
                    total,
                })
            })
            .map_err(PipelineError::from_anyhow)?;
        let best_params = tuned.best.params;
        log::info!(
            "Best trial #{}: hidden={} layers={} lr={} (score {:.6})",
            tuned.best.index,
            best_params.hidden_dim,
            best_params.num_layers,
            best_params.learning_rate,
            tuned.best.score
        );

        on_progress(ProgressEvent::Stage(RunStage::FinalTraining));
        let config = ModelConfig::new(n_features, best_params.hidden_dim, best_params.num_layers);
        let final_model = train_model(
            config,
            best_params.learning_rate,
            epochs,
            &prepared.train,
            &device,
        )
        .map_err(PipelineError::from_anyhow)?;
        let validation_loss =
            checked_valid_loss(&final_model, &prepared.valid, &device, &best_params)
                .map_err(PipelineError::from_anyhow)?;
        save_weights(&final_model.varmap, &self.weights_path).map_err(PipelineError::from_anyhow)?;

        on_progress(ProgressEvent::Stage(RunStage::Predicting));
        let model =
            load_weights(config, &self.weights_path, &device).map_err(PipelineError::from_anyhow)?;

        let split = &prepared.split;
        let n_valid = split.valid_scaled.n_rows();
        let last_window = split.valid_scaled.rows_flat(n_valid - seq_length..n_valid);
        let scaled_next = predict_next(&model, last_window, seq_length, n_features, &device)
            .map_err(PipelineError::from_anyhow)?;
        let predicted_row = split.scaler.inverse_vec(&scaled_next);

        let ohlc = |row: &[f64]| {
            Ohlc::from_row(row)
                .ok_or_else(|| PipelineError::Failed("feature rows lack OHLC columns".to_string()))
        };
        let predicted = ohlc(&predicted_row)?;
        let actual = ohlc(
            split
                .valid_original
                .last_row()
                .ok_or_else(|| PipelineError::InsufficientRows("empty validation split".into()))?,
        )?;

        let validation_curve = predict_all(&model, &prepared.valid, &device)
            .map_err(PipelineError::from_anyhow)?
            .iter()
            .enumerate()
            .map(|(i, scaled)| ValidationPoint {
                index: i,
                actual_close: split.valid_original.row(i + seq_length)[CLOSE_COLUMN],
                predicted_close: split.scaler.inverse_vec(scaled)[CLOSE_COLUMN],
            })
            .collect();

        Ok(ForecastReport {
            request: request.clone(),
            source: features.source.clone(),
            n_bars: features.n_bars,
            n_rows: features.matrix.n_rows(),
            best_params,
            validation_loss,
            actual,
            predicted,
            trials: tuned.trials,
            validation_curve,
            elapsed: started.elapsed(),
        })
    }
}

fn checked_valid_loss(
    trained: &crate::nn::TrainedModel,
    valid: &SequenceSet,
    device: &Device,
    params: &HyperParams,
) -> anyhow::Result<f64> {
    if !trained.final_loss.is_finite() {
        return Err(PipelineError::Diverged(format!(
            "training loss {} with hidden={} layers={} lr={}",
            trained.final_loss, params.hidden_dim, params.num_layers, params.learning_rate
        ))
        .into());
    }
    let loss = model_loss(&trained.model, valid, device)?;
    if !loss.is_finite() {
        return Err(PipelineError::Diverged(format!(
            "validation loss {} with hidden={} layers={} lr={}",
            loss, params.hidden_dim, params.num_layers, params.learning_rate
        ))
        .into());
    }
    Ok(loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tuner::{AcquisitionSettings, SearchSpace, SurrogateSettings};
    use crate::config::tuner::Bound;
    use chrono::NaiveDate;

    const SMALL_TUNER: TunerConfig = TunerConfig {
        init_points: 2,
        n_iter: 1,
        random_state: 1,
        space: SearchSpace {
            hidden_dim: Bound::new(1.0, 6.0),
            num_layers: Bound::new(1.0, 2.0),
            learning_rate: Bound::new(0.001, 0.01),
        },
        surrogate: SurrogateSettings {
            alpha: 1e-6,
            length_scale_grid: &[0.2, 1.0],
        },
        acquisition: AcquisitionSettings {
            kappa: 2.576,
            xi: 0.0,
            n_warmup: 200,
            n_refine_seeds: 2,
            refine_iters: 5,
        },
    };

    fn request(seq_length: usize) -> ForecastRequest {
        ForecastRequest {
            key: DataKey::new(
                "TEST",
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            ),
            seq_length,
            device: ComputeDevice::Cpu,
            prefer_api: false,
            acquisition: AcquisitionKind::Ucb,
        }
    }

    fn synthetic_features(n_rows: usize) -> CachedFeatures {
        let columns = ["open", "high", "low", "close", "volume", "extra"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let data = (0..n_rows)
            .flat_map(|r| {
                let base = 100.0 + (r as f64 * 0.15).sin() * 10.0;
                [base, base + 2.0, base - 2.0, base + 0.5, 1e6 + r as f64, r as f64]
            })
            .collect();
        CachedFeatures {
            source: "synthetic".to_string(),
            n_bars: n_rows,
            matrix: FeatureMatrix::new(columns, data).unwrap(),
        }
    }

    fn pipeline(tag: &str) -> (tokio::runtime::Runtime, ForecastPipeline) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let path = std::env::temp_dir()
            .join(format!("lstm_tuner_pipeline_{}_{}", tag, std::process::id()))
            .join("weights.safetensors");
        let p = ForecastPipeline::new(rt.handle().clone())
            .with_tuner(&SMALL_TUNER)
            .with_epochs(3)
            .with_weights_path(path);
        (rt, p)
    }

    #[test]
    fn test_end_to_end_on_synthetic_features() {
        let (_rt, pipeline) = pipeline("e2e");
        let features = synthetic_features(120);
        let req = request(10);
        let mut trials_seen = 0;
        let mut stages = Vec::new();
        let report = pipeline
            .run_on_features(&req, &features, Instant::now(), &mut |event| match event {
                ProgressEvent::Trial { total, .. } => {
                    assert_eq!(total, 3);
                    trials_seen += 1;
                }
                ProgressEvent::Stage(stage) => stages.push(stage),
            })
            .unwrap();

        assert_eq!(trials_seen, 3);
        assert_eq!(report.trials.len(), 3);
        assert!(stages.contains(&RunStage::Predicting));
        assert!(report.validation_loss.is_finite());
        // 120 rows → 24 validation rows → 14 validation windows of 10
        assert_eq!(report.validation_curve.len(), 14);
        let last = features.matrix.row(119);
        assert_eq!(report.actual.close, last[3]);
        assert!(report.predicted.close.is_finite());
        assert!(pipeline.weights_path.exists());
        let _ = std::fs::remove_file(&pipeline.weights_path);
    }

    #[test]
    fn test_short_validation_split_is_insufficient() {
        let (_rt, pipeline) = pipeline("short");
        // 60 rows → 12 validation rows, too few for a window of 12 plus a target
        let err = pipeline
            .run_on_features(&request(12), &synthetic_features(60), Instant::now(), &mut |_| {})
            .unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientRows(_)));
    }

    #[test]
    fn test_invalid_requests_rejected_before_fetching() {
        let (_rt, pipeline) = pipeline("invalid");
        let mut zero = request(0);
        assert!(matches!(
            pipeline.run(&zero, &mut |_| {}),
            Err(PipelineError::InvalidInput(_))
        ));
        zero.seq_length = 5;
        zero.key.end = zero.key.start;
        assert!(matches!(
            pipeline.run(&zero, &mut |_| {}),
            Err(PipelineError::InvalidInput(_))
        ));
        assert!(pipeline.cache().is_empty());
    }
}
