// Core data models
pub mod feature_matrix;
pub mod price_series;

// Re-export commonly used types
pub use feature_matrix::FeatureMatrix;
pub use price_series::PriceSeries;
