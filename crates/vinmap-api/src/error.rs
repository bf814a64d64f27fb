//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Errors surfaced to HTTP callers as `{ "error": message }`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    MethodNotAllowed,
    /// Upstream gateway failure, passed through with the gateway's status.
    Upstream { status: StatusCode, message: String },
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream { status, .. } => *status,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg,
            ApiError::Upstream { message, .. } => message,
            ApiError::MethodNotAllowed => "Method not allowed",
        }
    }
}

impl From<vinmap_core::Error> for ApiError {
    fn from(err: vinmap_core::Error) -> Self {
        use vinmap_core::Error;

        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::Gateway { status, .. } => {
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                ApiError::Upstream {
                    status,
                    message: err.to_string(),
                }
            }
            Error::ResponseFormat { .. } => ApiError::BadGateway(err.to_string()),
            Error::NotFound(_) | Error::WineNotFound(_) => ApiError::NotFound(err.to_string()),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => {
                error!(error = %other, "Request failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use vinmap_core::{Error, PipelineStep};

    #[test]
    fn test_validation_is_bad_request() {
        let err = ApiError::from(Error::Validation("Image is required".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Image is required");
    }

    #[test]
    fn test_gateway_status_passes_through() {
        let err = ApiError::from(Error::Gateway {
            step: PipelineStep::DetailSynthesis,
            status: 429,
            message: "Rate limited".to_string(),
        });
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.message(), "detail synthesis failed: Rate limited");
    }

    #[test]
    fn test_gateway_success_status_becomes_bad_gateway() {
        let err = ApiError::from(Error::Gateway {
            step: PipelineStep::SingleShot,
            status: 200,
            message: "odd".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_response_format_is_bad_gateway() {
        let err = ApiError::from(Error::ResponseFormat {
            step: PipelineStep::LabelExtraction,
            raw: "nope".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_lookup_and_auth_mapping() {
        assert_eq!(
            ApiError::from(Error::WineNotFound(Uuid::nil())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(Error::Unauthorized("Invalid password".to_string())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(Error::Config("bad".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
