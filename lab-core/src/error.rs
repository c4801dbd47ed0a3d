//! Error types for the LAB core.
//!
//! Uses `thiserror` for public API error types. Only configuration and
//! input-shape problems are fatal; metric arithmetic never errors.

use std::path::PathBuf;

/// Top-level error type for the LAB core library.
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Shape mismatch: {cases} cases but {responses} responses")]
    ShapeMismatch { cases: usize, responses: usize },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LabError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }
}

/// Errors from threshold and workspace configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown domain '{name}' (expected one of: {expected})")]
    UnknownDomain { name: String, expected: String },

    #[error("Invalid thresholds file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = LabError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_display() {
        let err = LabError::ShapeMismatch {
            cases: 3,
            responses: 2,
        };
        assert_eq!(
            err.to_string(),
            "Shape mismatch: 3 cases but 2 responses"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: LabError = ConfigError::UnknownDomain {
            name: "astrology".into(),
            expected: "medicine".into(),
        }
        .into();
        assert!(matches!(err, LabError::Config(_)));
        assert!(err.to_string().contains("astrology"));
    }
}
