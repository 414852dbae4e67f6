// End-to-end forecast run: fetch → features → split → sequences → tune → predict
pub mod cache;
pub mod error;
pub mod forecast;
pub mod report;

// Re-export commonly used types
pub use cache::{CachedFeatures, FeatureCache};
pub use error::PipelineError;
pub use forecast::{
    ForecastPipeline, ForecastReport, ForecastRequest, ProgressEvent, RunStage, ValidationPoint,
};
pub use report::{ReportSection, report_lines, report_sections};
