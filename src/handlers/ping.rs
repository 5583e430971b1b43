use serde_json::json;

use crate::middleware::{ApiResponse, ApiResult};
use crate::router::RequestScope;

/// GET /ping - liveness probe, no authentication
pub fn ping(_scope: &RequestScope<'_>) -> ApiResult {
    ApiResponse::ok(json!({ "ping": "pong" }))
}
