use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::AppConfig;
use crate::router::RouteRegistry;
use crate::storage::Storage;

/// Everything a request needs, cloned into each request by axum
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub keys: Arc<TokenKeys>,
    pub routes: Arc<RouteRegistry>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(storage: Storage, keys: TokenKeys, routes: RouteRegistry, config: AppConfig) -> Self {
        Self {
            storage,
            keys: Arc::new(keys),
            routes: Arc::new(routes),
            config: Arc::new(config),
        }
    }
}
