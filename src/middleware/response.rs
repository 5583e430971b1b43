use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Successful handler result: a status and an optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status_code: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Create a successful API response with custom status code
    pub fn with_status<T: Serialize>(data: T, status_code: StatusCode) -> ApiResult {
        Ok(Self {
            status_code,
            body: Some(serde_json::to_value(data)?),
        })
    }

    /// Create a 200 OK response
    pub fn ok<T: Serialize>(data: T) -> ApiResult {
        Self::with_status(data, StatusCode::OK)
    }

    /// Create a 201 Created response
    pub fn created<T: Serialize>(data: T) -> ApiResult {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// Create a 204 No Content response
    pub fn no_content() -> ApiResult {
        Ok(Self {
            status_code: StatusCode::NO_CONTENT,
            body: None,
        })
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status_code, Json(body)).into_response(),
            None => self.status_code.into_response(),
        }
    }
}

pub type ApiResult = Result<ApiResponse, ApiError>;
