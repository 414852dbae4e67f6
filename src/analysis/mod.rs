// Feature engineering and dataset preparation
pub mod features;
pub mod normalize;
pub mod sequence;

// Re-export commonly used types
pub use features::build_features;
pub use normalize::{MinMaxScaler, NormalizedSplit, normalize_split, split_counts};
pub use sequence::{SequenceSet, create_sequences};
