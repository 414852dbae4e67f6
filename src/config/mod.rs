//! Configuration module for the LSTM tuner application.

pub mod features;
pub mod inputs;
pub mod providers;
pub mod training;
pub mod tuner;

mod debug; // Private: use crate::config::DEBUG_FLAGS
pub use debug::DEBUG_FLAGS;

pub mod persistence;

// Re-export commonly used items
pub use features::{FEATURES, IndicatorKind};
pub use inputs::INPUT_DEFAULTS;
pub use persistence::{PERSISTENCE, price_cache_filename};
pub use providers::PROVIDERS;
pub use training::TRAINING;
pub use tuner::TUNER;
