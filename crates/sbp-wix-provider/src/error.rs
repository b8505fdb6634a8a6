use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sbp::SbpError;
use std::fmt;

/// Failure of a platform-facing provider endpoint.
#[derive(Debug)]
pub enum ApiError {
    /// Bearer token missing or wrong
    Unauthorized(&'static str),
    /// Request body did not parse
    InvalidRequest(String),
    /// Adapter operation failed
    Adapter(SbpError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            ApiError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            ApiError::Adapter(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<SbpError> for ApiError {
    fn from(e: SbpError) -> Self {
        ApiError::Adapter(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Adapter(e) => match e {
                SbpError::UnsupportedCurrency(_) | SbpError::Serde(_) => StatusCode::BAD_REQUEST,
                SbpError::Http(_) | SbpError::Platform(_) => StatusCode::BAD_GATEWAY,
                SbpError::SecretStore(_) | SbpError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ApiError::Unauthorized(msg) => HttpResponse::build(status).json(serde_json::json!({
                "error": msg
            })),
            ApiError::InvalidRequest(msg) => HttpResponse::build(status).json(serde_json::json!({
                "error": "invalid_request",
                "message": msg
            })),
            ApiError::Adapter(SbpError::UnsupportedCurrency(code)) => {
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "unsupported_currency",
                    "message": format!("Currency '{code}' is not supported")
                }))
            }
            ApiError::Adapter(SbpError::Serde(_)) => {
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "invalid_request",
                    "message": "Request could not be serialized"
                }))
            }
            ApiError::Adapter(e @ (SbpError::Http(_) | SbpError::Platform(_))) => {
                tracing::error!(error = %e, "upstream call failed");
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "upstream_error",
                    "message": "Failed to reach upstream service"
                }))
            }
            ApiError::Adapter(e) => {
                tracing::error!(error = %e, "internal error");
                HttpResponse::build(status).json(serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                }))
            }
        }
    }
}
