use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::Role;

/// Caller resolved from a verified bearer token. Bound once per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: Role,
}

/// Resolves the optional caller before dispatch.
///
/// Without an `Authorization` header the request continues anonymously. A
/// header that does not carry a valid token for a known user ends the request
/// with 401 and the handler never runs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_jwt_from_headers(request.headers())? else {
        return Ok(next.run(request).await);
    };

    let user_id = state.keys.verify(&token).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        ApiError::unauthenticated()
    })?;

    let role = {
        let inventory = state.storage.read();
        inventory.users.get(&user_id).map(|user| user.role)
    };
    let Some(role) = role else {
        warn!("Token subject {} is not a known user", user_id);
        return Err(ApiError::unauthenticated());
    };

    debug!("Authenticated {} as {}", user_id, role.as_str());
    request.extensions_mut().insert(AuthenticatedUser { id: user_id, role });

    Ok(next.run(request).await)
}

/// `Ok(None)` when there is no header at all
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header.to_str().map_err(|_| {
        debug!("Authorization header is not valid ASCII");
        ApiError::unauthenticated()
    })?;

    match auth_str.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(Some(token.to_string())),
        _ => {
            debug!("Authorization header must use Bearer token format");
            Err(ApiError::unauthenticated())
        }
    }
}
