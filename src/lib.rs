pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod storage;
pub mod validation;

use axum::{middleware::from_fn_with_state, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::router::{RegistryError, RouteRegistry};
use crate::state::AppState;

/// Registry of every endpoint the API serves
pub fn build_routes() -> Result<RouteRegistry, RegistryError> {
    RouteRegistry::from_table(handlers::routes())
}

/// The full HTTP application: authentication, then dispatch through the registry
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .fallback(router::dispatch)
        .layer(from_fn_with_state(state.clone(), middleware::authenticate))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
