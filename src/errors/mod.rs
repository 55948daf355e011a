use thiserror::Error;

/// Failures raised by the evaluation core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A rating record could not be turned into (user, item, rating, timestamp)
    #[error("Malformed rating record {record}: {reason}")]
    Format { record: usize, reason: String },

    /// Fold count outside [2, number of ratings]
    #[error("Invalid fold count {folds} for {ratings} ratings (expected 2..={ratings})")]
    InvalidFoldCount { folds: usize, ratings: usize },

    /// Predictor or evaluation settings rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    pub fn format(record: usize, reason: impl Into<String>) -> Self {
        EvalError::Format {
            record,
            reason: reason.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        EvalError::InvalidConfiguration(reason.into())
    }
}

/// Add context to rating file errors
pub fn load_context(path: &str) -> String {
    format!("Failed to load ratings from: {}", path)
}

/// Add context to report output errors
pub fn write_context(path: &str) -> String {
    format!("Failed to write report to: {}", path)
}
