// src/error.rs

//! Unified error handling for the sync job.

use std::fmt;

use thiserror::Error;

use crate::pipeline::IngestStage;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream request failed (transport error or non-success status)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Upstream body did not have the expected structure
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// Upstream returned no usable records
    #[error("No data received from upstream")]
    EmptyUpstreamData,

    /// Upstream returned fewer records than the configured minimum
    #[error("Roster too small: received {actual} records, expected at least {expected}")]
    BelowMinimumThreshold { actual: usize, expected: usize },

    /// Roster size moved more than the configured maximum
    #[error("Roster size changed by {percent:.1}% (limit {threshold}%)")]
    ExcessiveChange { percent: f64, threshold: f64 },

    /// Writing to a store or audit artifact failed
    #[error("Persistence error ({destination}): {message}")]
    Persistence {
        destination: String,
        message: String,
    },

    /// Ingestion run stopped before committing
    #[error("Ingestion aborted during {stage}: {source}")]
    Aborted {
        stage: IngestStage,
        #[source]
        source: Box<AppError>,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an upstream error.
    pub fn upstream(message: impl fmt::Display) -> Self {
        Self::Upstream(message.to_string())
    }

    /// Create a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Create a persistence error for a named destination.
    pub fn persistence(destination: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Persistence {
            destination: destination.into(),
            message: message.to_string(),
        }
    }

    /// Wrap an error with the stage the run stopped in.
    pub fn aborted(stage: IngestStage, source: AppError) -> Self {
        Self::Aborted {
            stage,
            source: Box::new(source),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for the validation gate's rejections.
    pub fn is_gate_rejection(&self) -> bool {
        matches!(
            self,
            Self::EmptyUpstreamData
                | Self::BelowMinimumThreshold { .. }
                | Self::ExcessiveChange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_message_names_stage_and_cause() {
        let err = AppError::aborted(IngestStage::Validating, AppError::EmptyUpstreamData);
        assert_eq!(
            err.to_string(),
            "Ingestion aborted during VALIDATING: No data received from upstream"
        );
    }

    #[test]
    fn gate_rejections_are_classified() {
        assert!(AppError::EmptyUpstreamData.is_gate_rejection());
        assert!(
            AppError::BelowMinimumThreshold {
                actual: 1,
                expected: 400
            }
            .is_gate_rejection()
        );
        assert!(!AppError::upstream("503").is_gate_rejection());
    }
}
