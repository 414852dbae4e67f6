//! Model training and data split configuration

/// Settings for the chronological train/validation split
pub struct SplitSettings {
    /// Share of rows (percent, floored) held back for validation.
    /// Integer maths keeps `n_train + n_valid == n` exact.
    pub validation_pct: usize,
}

/// Settings for the full-batch training loop
pub struct TrainingConfig {
    /// Epochs per training run (trials and the final model alike)
    pub epochs: usize,
    pub split: SplitSettings,
    /// Adam moment decay rates
    pub adam_beta1: f64,
    pub adam_beta2: f64,
    pub adam_eps: f64,
}

pub const TRAINING: TrainingConfig = TrainingConfig {
    epochs: 100,
    split: SplitSettings { validation_pct: 20 },
    adam_beta1: 0.9,
    adam_beta2: 0.999,
    adam_eps: 1e-8,
};
