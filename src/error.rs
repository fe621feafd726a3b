// HTTP API Error Types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};

use crate::api::{DecodeError, Envelope};
use crate::data::ModelError;
use crate::validator::FieldErrors;

const SERVER_ERROR_MESSAGE: &str = "the server encountered a problem and could not process your request";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 422 Unprocessable Entity (well-formed input that failed validation)
    FailedValidation(FieldErrors),

    // 500 Internal Server Error; the detail is logged, never sent
    InternalServerError(String),
}

/// Attached to 5xx responses so the error-logging middleware can report
/// what actually went wrong.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ServerErrorDetail(pub String);

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to JSON response body: `{"error": ...}`
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::MethodNotAllowed(msg) => {
                json!({ "error": msg })
            }
            ApiError::FailedValidation(field_errors) => json!({ "error": field_errors }),
            ApiError::InternalServerError(_) => json!({ "error": SERVER_ERROR_MESSAGE }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("the requested resource could not be found".to_string())
    }

    pub fn method_not_allowed(method: &str) -> Self {
        ApiError::MethodNotAllowed(format!("the {} method is not supported for this resource", method))
    }

    pub fn failed_validation(field_errors: FieldErrors) -> Self {
        ApiError::FailedValidation(field_errors)
    }

    pub fn internal_server_error(detail: impl Into<String>) -> Self {
        ApiError::InternalServerError(detail.into())
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        if err.is_internal() {
            ApiError::internal_server_error(err.to_string())
        } else {
            ApiError::bad_request(err.to_string())
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::RecordNotFound => ApiError::not_found(),
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal_server_error(format!("JSON serialization error: {}", err))
    }
}

impl From<axum::http::header::InvalidHeaderValue> for ApiError {
    fn from(err: axum::http::header::InvalidHeaderValue) -> Self {
        ApiError::internal_server_error(format!("invalid header value: {}", err))
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::InternalServerError(msg) => write!(f, "{}", msg),
            ApiError::FailedValidation(errors) => write!(f, "failed validation: {:?}", errors),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match serde_json::to_vec(&self.to_json()) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                bytes
            }
            Err(_) => format!("{{\"error\":\"{}\"}}\n", SERVER_ERROR_MESSAGE).into_bytes(),
        };

        let mut response = (status, body).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let ApiError::InternalServerError(detail) = self {
            response.extensions_mut().insert(ServerErrorDetail(detail));
        }
        response
    }
}

/// Shorthand for handlers: an envelope written with `status` or an `ApiError`.
pub type ApiResult = Result<Response, ApiError>;

/// Convenience used by handlers that answer with a single keyed value.
pub fn envelope<T: serde::Serialize + ?Sized>(key: &str, value: &T) -> Result<Envelope, ApiError> {
    Ok(Envelope::new().with(key, value)?)
}
