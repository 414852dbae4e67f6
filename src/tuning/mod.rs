// Bayesian hyperparameter search
pub mod acquisition;
pub mod optimizer;
pub mod params;
pub mod surrogate;

// Re-export commonly used types
pub use acquisition::AcquisitionKind;
pub use optimizer::{BayesianOptimizer, Trial, TrialPhase, TuneResult};
pub use params::{HyperParams, N_DIMS, Point};
pub use surrogate::GaussianProcess;
