// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::storage::StorageError;
use crate::validation::FieldErrors;

pub const AUTHORIZATION_DENIED: &str = "Authorization denied";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    MalformedRequest { raw: String },
    FieldValidation(FieldErrors),
    BadRequest(String),

    // 401 Unauthorized
    Unauthenticated(String),

    // Authenticated but lacking a capability or ownership. Reported as 401.
    Forbidden(String),

    // 404 Not Found. `key` names the id in the body, e.g. "EquipmentId"
    NotFound {
        message: String,
        key: &'static str,
        id: String,
    },

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MalformedRequest { .. } => 400,
            ApiError::FieldValidation(_) => 400,
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthenticated(_) => 401,
            ApiError::Forbidden(_) => 401,
            ApiError::NotFound { .. } => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::MalformedRequest { .. } => "Malformed JSON body",
            ApiError::FieldValidation(_) => "Validation failed",
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthenticated(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound { message, .. } => message,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::MalformedRequest { raw } => json!({
                "Value": raw,
                "Error": self.message()
            }),
            ApiError::FieldValidation(errors) => errors.to_json(),
            ApiError::NotFound { message, key, id } => {
                let mut body = json!({ "Error": message });
                body[*key] = json!(id);
                body
            }
            _ => json!({ "Error": self.message() }),
        }
    }

    /// Get error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MalformedRequest { .. } => "MALFORMED_REQUEST",
            ApiError::FieldValidation(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn malformed_request(raw: impl Into<String>) -> Self {
        ApiError::MalformedRequest { raw: raw.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthenticated() -> Self {
        ApiError::Unauthenticated(AUTHORIZATION_DENIED.to_string())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden(AUTHORIZATION_DENIED.to_string())
    }

    pub fn not_found(key: &'static str, message: impl Into<String>, id: impl ToString) -> Self {
        ApiError::NotFound {
            message: message.into(),
            key,
            id: id.to_string(),
        }
    }

    pub fn equipment_not_found(id: impl ToString) -> Self {
        Self::not_found("EquipmentId", "Equipment not found", id)
    }

    pub fn log_not_found(id: impl ToString) -> Self {
        Self::not_found("LogId", "Log entry not found", id)
    }

    pub fn user_not_found(id: impl ToString) -> Self {
        Self::not_found("UserId", "User not found", id)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // Log the real error but return generic message
        tracing::error!("Storage error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {}", err);
        ApiError::internal_server_error("Failed to format response")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;

    #[test]
    fn authorization_failures_share_status_and_body() {
        for err in [ApiError::unauthenticated(), ApiError::forbidden()] {
            assert_eq!(err.status_code(), 401);
            assert_eq!(err.to_json(), json!({"Error": "Authorization denied"}));
        }
    }

    #[test]
    fn not_found_echoes_the_id() {
        let err = ApiError::equipment_not_found("42");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_json(), json!({"Error": "Equipment not found", "EquipmentId": "42"}));
    }

    #[test]
    fn malformed_body_is_echoed() {
        let err = ApiError::malformed_request("{oops");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json(), json!({"Value": "{oops", "Error": "Malformed JSON body"}));
    }

    #[test]
    fn field_validation_renders_the_field_map() {
        let errors = [FieldError::new("Price", Some(&json!(-5)), "Expected a non-negative number")]
            .into_iter()
            .collect();
        let err = ApiError::FieldValidation(errors);
        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_json(),
            json!({"Price": {"Value": -5, "Error": "Expected a non-negative number"}})
        );
    }
}
