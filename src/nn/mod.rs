// LSTM forecaster built on candle
pub mod device;
pub mod lstm;
pub mod trainer;
pub mod weights;

// Re-export commonly used types
pub use device::ComputeDevice;
pub use lstm::{LstmForecaster, ModelConfig};
pub use trainer::{TrainedModel, model_loss, predict_next, train_model};
pub use weights::{load_weights, save_weights};
