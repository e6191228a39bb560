use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON error on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid case {id}: {reason}")]
    InvalidCase { id: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl OpsError {
    pub fn invalid_case(id: &str, reason: impl Into<String>) -> Self {
        OpsError::InvalidCase {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OpsError>;
