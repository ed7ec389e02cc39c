use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire shape of every non-streaming error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation errors (VALID_xxx)
    ValidInvalidInput,
    ValidMissingRequiredField,

    // Resource errors (RESOURCE_xxx)
    ResourceNotFound,

    // System errors (SYSTEM_xxx)
    SystemInternalError,
    SystemStreamingError,
    SystemExternalServiceError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidInvalidInput => "VALID_INVALID_INPUT",
            ErrorCode::ValidMissingRequiredField => "VALID_MISSING_REQUIRED_FIELD",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::SystemInternalError => "SYSTEM_INTERNAL_ERROR",
            ErrorCode::SystemStreamingError => "SYSTEM_STREAMING_ERROR",
            ErrorCode::SystemExternalServiceError => "SYSTEM_EXTERNAL_SERVICE_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidInvalidInput | ErrorCode::ValidMissingRequiredField => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::SystemInternalError
            | ErrorCode::SystemStreamingError
            | ErrorCode::SystemExternalServiceError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppError {
    code: ErrorCode,
    message: String,
    details: Option<serde_json::Value>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Convenience constructors for common errors
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidInvalidInput, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorCode::ResourceNotFound, format!("{} not found", resource))
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SystemInternalError, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ApiError {
            error: self.message,
            error_code: self.code.as_str().to_string(),
            details: self.details,
        });

        (self.code.status_code(), body).into_response()
    }
}

pub type ApiResult<T> = Result<(StatusCode, T), (StatusCode, AppError)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        assert_eq!(ErrorCode::ValidInvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::SystemStreamingError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_carries_code_and_details() {
        let err = AppError::invalid_request("Invalid request body")
            .with_details(serde_json::json!({"threadId": ["Required"]}));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "ValidInvalidInput");
        assert_eq!(json["message"], "Invalid request body");
    }
}
