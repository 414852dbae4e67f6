use std::fmt;

/// Why a forecast run stopped. Every variant is fatal to the current run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Inputs rejected before any work was done
    InvalidInput(String),
    /// No provider returned any bars for the request
    NoData(String),
    /// Too few usable rows for the split and sequence length
    InsufficientRows(String),
    /// Training or validation loss became non-finite
    Diverged(String),
    /// Anything else (I/O, tensor backend, weight persistence)
    Failed(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PipelineError::NoData(msg) => write!(f, "No data available: {}", msg),
            PipelineError::InsufficientRows(msg) => write!(f, "Not enough data: {}", msg),
            PipelineError::Diverged(msg) => write!(f, "Training diverged: {}", msg),
            PipelineError::Failed(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    /// Recovers a typed error that travelled through `anyhow`, otherwise wraps
    /// the full context chain as `Failed`.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        match err.downcast::<PipelineError>() {
            Ok(typed) => typed,
            Err(other) => PipelineError::Failed(format!("{:#}", other)),
        }
    }
}
