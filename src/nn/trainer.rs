use anyhow::{Result, bail};
use candle_core::{DType, Device, Tensor};
use candle_nn::{AdamW, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap, loss};

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::TRAINING;
use crate::analysis::SequenceSet;
use crate::nn::lstm::{LstmForecaster, ModelConfig};

/// A trained forecaster plus the variables backing it (needed to save weights).
pub struct TrainedModel {
    pub varmap: VarMap,
    pub model: LstmForecaster,
    /// Training loss after the last epoch. May be non-finite if training diverged.
    pub final_loss: f64,
}

fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|&v| v as f32).collect()
}

/// (windows, targets) as (count, L, F) and (count, F) tensors.
pub fn sequences_to_tensors(set: &SequenceSet, device: &Device) -> Result<(Tensor, Tensor)> {
    if set.is_empty() {
        bail!("Cannot build tensors from an empty sequence set");
    }
    let count = set.len();
    let xs = Tensor::from_vec(
        to_f32(set.windows_flat()),
        (count, set.seq_length, set.n_features),
        device,
    )?;
    let ys = Tensor::from_vec(to_f32(set.targets_flat()), (count, set.n_features), device)?;
    Ok((xs, ys))
}

/// Builds a freshly initialised model and its variables.
pub fn build_model(config: ModelConfig, device: &Device) -> Result<(VarMap, LstmForecaster)> {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let model = LstmForecaster::new(config, vb)?;
    Ok((varmap, model))
}

/// Full-batch Adam on MSE for `epochs` epochs. Stops early only if the loss
/// stops being finite.
pub fn train_model(
    config: ModelConfig,
    learning_rate: f64,
    epochs: usize,
    train: &SequenceSet,
    device: &Device,
) -> Result<TrainedModel> {
    let (varmap, model) = build_model(config, device)?;
    let (xs, ys) = sequences_to_tensors(train, device)?;

    let params = ParamsAdamW {
        lr: learning_rate,
        beta1: TRAINING.adam_beta1,
        beta2: TRAINING.adam_beta2,
        eps: TRAINING.adam_eps,
        weight_decay: 0.0,
    };
    let mut optimizer = AdamW::new(varmap.all_vars(), params)?;

    let mut final_loss = f64::NAN;
    for epoch in 0..epochs {
        let predictions = model.forward(&xs)?;
        let loss = loss::mse(&predictions, &ys)?;
        optimizer.backward_step(&loss)?;
        final_loss = loss.to_scalar::<f32>()? as f64;

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_epochs && epoch % DEBUG_FLAGS.epoch_log_interval == 0 {
            log::info!("Epoch {:4}/{}: train loss = {:.6}", epoch + 1, epochs, final_loss);
        }

        if !final_loss.is_finite() {
            log::warn!("⚠️  Training loss became non-finite at epoch {}", epoch + 1);
            break;
        }
    }

    Ok(TrainedModel {
        varmap,
        model,
        final_loss,
    })
}

/// Mean squared error of the model over a whole sequence set.
pub fn model_loss(model: &LstmForecaster, set: &SequenceSet, device: &Device) -> Result<f64> {
    let (xs, ys) = sequences_to_tensors(set, device)?;
    let predictions = model.forward(&xs)?;
    Ok(loss::mse(&predictions, &ys)?.to_scalar::<f32>()? as f64)
}

/// One-step-ahead predictions for every window in `set`, scaled units.
pub fn predict_all(model: &LstmForecaster, set: &SequenceSet, device: &Device) -> Result<Vec<Vec<f64>>> {
    let (xs, _) = sequences_to_tensors(set, device)?;
    let rows = model.forward(&xs)?.to_vec2::<f32>()?;
    Ok(rows
        .into_iter()
        .map(|r| r.into_iter().map(f64::from).collect())
        .collect())
}

/// Prediction for a single flat window of `seq_length × n_features` values.
pub fn predict_next(
    model: &LstmForecaster,
    window: &[f64],
    seq_length: usize,
    n_features: usize,
    device: &Device,
) -> Result<Vec<f64>> {
    if window.len() != seq_length * n_features {
        bail!(
            "Window has {} values, expected {} x {}",
            window.len(),
            seq_length,
            n_features
        );
    }
    let xs = Tensor::from_vec(to_f32(window), (1, seq_length, n_features), device)?;
    let out = model.forward(&xs)?.squeeze(0)?.to_vec1::<f32>()?;
    Ok(out.into_iter().map(f64::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::create_sequences;
    use crate::models::FeatureMatrix;

    fn wave_sequences(n_rows: usize, seq_length: usize) -> SequenceSet {
        let columns = vec!["a".to_string(), "b".to_string()];
        let data = (0..n_rows)
            .flat_map(|r| {
                let t = r as f64 * 0.2;
                [0.5 + 0.4 * t.sin(), 0.5 + 0.4 * t.cos()]
            })
            .collect();
        let matrix = FeatureMatrix::new(columns, data).unwrap();
        create_sequences(&matrix, seq_length)
    }

    #[test]
    fn test_training_reduces_loss() {
        let device = Device::Cpu;
        let set = wave_sequences(60, 5);
        let config = ModelConfig::new(2, 8, 1);

        let (_, untrained) = build_model(config, &device).unwrap();
        let before = model_loss(&untrained, &set, &device).unwrap();

        let trained = train_model(config, 0.01, 60, &set, &device).unwrap();
        let after = model_loss(&trained.model, &set, &device).unwrap();

        assert!(trained.final_loss.is_finite());
        assert!(after < before, "loss {after} did not improve on {before}");
    }

    #[test]
    fn test_prediction_shapes() {
        let device = Device::Cpu;
        let set = wave_sequences(20, 4);
        let trained = train_model(ModelConfig::new(2, 3, 2), 0.001, 2, &set, &device).unwrap();

        let all = predict_all(&trained.model, &set, &device).unwrap();
        assert_eq!(all.len(), set.len());
        assert!(all.iter().all(|r| r.len() == 2));

        let next = predict_next(&trained.model, set.window(0), 4, 2, &device).unwrap();
        assert_eq!(next.len(), 2);
        assert!(predict_next(&trained.model, &[0.0; 3], 4, 2, &device).is_err());
    }

    #[test]
    fn test_empty_set_rejected() {
        let set = wave_sequences(3, 5);
        assert!(set.is_empty());
        assert!(train_model(ModelConfig::new(2, 3, 1), 0.01, 1, &set, &Device::Cpu).is_err());
    }
}
