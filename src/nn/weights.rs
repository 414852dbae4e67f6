use std::path::Path;

use anyhow::{Context, Result};
use candle_core::Device;
use candle_nn::VarMap;

use crate::nn::lstm::{LstmForecaster, ModelConfig};
use crate::nn::trainer::build_model;

/// Writes every variable to a safetensors file, replacing any previous file.
pub fn save_weights(varmap: &VarMap, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    varmap
        .save(path)
        .context(format!("Failed to save weights to: {}", path.display()))
}

/// Builds a fresh model of shape `config` and overwrites its variables from `path`.
pub fn load_weights(config: ModelConfig, path: &Path, device: &Device) -> Result<LstmForecaster> {
    let (mut varmap, model) = build_model(config, device)?;
    varmap
        .load(path)
        .context(format!("Failed to load weights from: {}", path.display()))?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::trainer::{predict_next, train_model};
    use crate::analysis::create_sequences;
    use crate::models::FeatureMatrix;

    #[test]
    fn test_round_trip_gives_identical_predictions() {
        let device = Device::Cpu;
        let columns = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let data = (0..90).map(|i| (i as f64 * 0.37).sin().abs()).collect();
        let matrix = FeatureMatrix::new(columns, data).unwrap();
        let set = create_sequences(&matrix, 6);

        let config = ModelConfig::new(3, 5, 2);
        let trained = train_model(config, 0.005, 5, &set, &device).unwrap();

        let path = std::env::temp_dir()
            .join(format!("lstm_tuner_weights_{}", std::process::id()))
            .join("model.safetensors");
        save_weights(&trained.varmap, &path).unwrap();
        let reloaded = load_weights(config, &path, &device).unwrap();
        let _ = std::fs::remove_file(&path);

        let window = set.window(set.len() - 1);
        let a = predict_next(&trained.model, window, 6, 3, &device).unwrap();
        let b = predict_next(&reloaded, window, 6, 3, &device).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("lstm_tuner_no_such_weights.safetensors");
        assert!(load_weights(ModelConfig::new(2, 2, 1), &path, &Device::Cpu).is_err());
    }
}
