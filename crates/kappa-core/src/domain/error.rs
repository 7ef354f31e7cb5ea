//! Error taxonomy for the agreement engine.
//!
//! Only the ambient layer (configuration, sources, report writers) can fail.
//! Data problems inside a task narrow the data instead and are recorded as
//! [`Exclusion`](crate::domain::Exclusion) entries.

/// Raised when a raw paper identifier has no recognizable DOI form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no DOI could be extracted from {raw:?}")]
pub struct InvalidPaperId {
    pub raw: String,
}

/// Engine errors.
#[derive(Debug, thiserror::Error)]
pub enum KappaError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("submission source unavailable for task {task_id}: {reason}")]
    SourceUnavailable { task_id: String, reason: String },

    #[error("batch worker failed: {0}")]
    Worker(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, KappaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_paper_id_display_quotes_raw_input() {
        let err = InvalidPaperId {
            raw: "not a doi".to_string(),
        };
        assert_eq!(err.to_string(), "no DOI could be extracted from \"not a doi\"");
    }

    #[test]
    fn source_unavailable_display() {
        let err = KappaError::SourceUnavailable {
            task_id: "197".to_string(),
            reason: "directory missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "submission source unavailable for task 197: directory missing"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: KappaError = io.into();
        assert!(matches!(err, KappaError::Io(_)));
    }
}
