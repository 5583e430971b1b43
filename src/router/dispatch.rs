use std::collections::HashMap;

use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::{RequestBody, RequestScope};
use crate::error::ApiError;
use crate::middleware::{ApiResult, AuthenticatedUser};
use crate::state::AppState;

/// Single fallback handler: resolves the route from the registry and runs it
pub async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let user = parts.extensions.get::<AuthenticatedUser>().copied();

    match run(&state, &parts, user, body).await {
        Ok(response) => {
            debug!("{} {} -> {}", parts.method, parts.uri.path(), response.status_code);
            response.into_response()
        }
        Err(err) => {
            if err.status_code() >= 500 {
                error!("{} {} failed: {}", parts.method, parts.uri.path(), err);
            } else {
                debug!(
                    "{} {} rejected with {}: {}",
                    parts.method,
                    parts.uri.path(),
                    err.error_code(),
                    err
                );
            }
            err.into_response()
        }
    }
}

async fn run(state: &AppState, parts: &Parts, user: Option<AuthenticatedUser>, body: Body) -> ApiResult {
    let matched = state.routes.resolve(&parts.method, parts.uri.path())?;

    let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map_err(|e| ApiError::bad_request(format!("Invalid query string: {}", e)))?;

    let limit = state.config.server.max_request_size_bytes;
    let body = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!("Request body not read (limit {} bytes): {}", limit, e);
            None
        }
    };

    let scope = RequestScope {
        user,
        params: matched.params,
        query,
        body: match &body {
            Some(bytes) => RequestBody::Read(bytes),
            None => RequestBody::TooLarge,
        },
        storage: &state.storage,
    };

    (matched.route.handler)(&scope)
}
