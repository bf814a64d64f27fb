//! Error types for vinmap.

use std::fmt;

use thiserror::Error;

/// Result type alias using vinmap's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Stage of the enrichment pipeline an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    /// Reading the text printed on the bottle.
    LabelExtraction,
    /// Producing descriptive and tasting metadata.
    DetailSynthesis,
    /// The one-request variant on the strong model tier.
    SingleShot,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStep::LabelExtraction => "label extraction",
            PipelineStep::DetailSynthesis => "detail synthesis",
            PipelineStep::SingleShot => "single-shot analysis",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for vinmap operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Required input missing or out of range
    #[error("{0}")]
    Validation(String),

    /// The AI gateway answered with a non-success status
    #[error("{step} failed: {message}")]
    Gateway {
        step: PipelineStep,
        status: u16,
        message: String,
    },

    /// The AI gateway answered, but no JSON object could be parsed from the reply
    #[error("{step} failed: could not parse AI response")]
    ResponseFormat { step: PipelineStep, raw: String },

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Wine not found
    #[error("Wine not found: {0}")]
    WineNotFound(uuid::Uuid),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Raw gateway reply attached to a response-format failure.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::ResponseFormat { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("API key is required".to_string());
        assert_eq!(err.to_string(), "API key is required");
    }

    #[test]
    fn test_error_display_gateway_names_step() {
        let err = Error::Gateway {
            step: PipelineStep::LabelExtraction,
            status: 401,
            message: "invalid x-api-key".to_string(),
        };
        assert_eq!(err.to_string(), "label extraction failed: invalid x-api-key");
    }

    #[test]
    fn test_error_display_response_format() {
        let err = Error::ResponseFormat {
            step: PipelineStep::DetailSynthesis,
            raw: "I cannot help with that".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "detail synthesis failed: could not parse AI response"
        );
        assert_eq!(err.raw_response(), Some("I cannot help with that"));
    }

    #[test]
    fn test_raw_response_absent_for_other_variants() {
        let err = Error::NotFound("wine".to_string());
        assert!(err.raw_response().is_none());
    }

    #[test]
    fn test_error_display_wine_not_found() {
        let id = Uuid::nil();
        let err = Error::WineNotFound(id);
        assert_eq!(err.to_string(), format!("Wine not found: {}", id));
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid password".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid password");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_pipeline_step_display() {
        assert_eq!(PipelineStep::SingleShot.to_string(), "single-shot analysis");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
