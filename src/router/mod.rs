//! Explicit route table and the fallback dispatcher that drives it

pub mod dispatch;
pub mod scope;
pub mod template;

use axum::http::Method;
use thiserror::Error;

use crate::error::ApiError;
use crate::middleware::ApiResult;

pub use dispatch::dispatch;
pub use scope::{Page, RequestBody, RequestScope};
pub use template::{split_path, PathParams, PathTemplate};

/// Handlers run synchronously against the resolved request scope
pub type Handler = fn(&RequestScope<'_>) -> ApiResult;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid route template {template}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("route {method} {template} duplicates {existing}")]
    Duplicate {
        method: Method,
        template: String,
        existing: String,
    },
}

pub struct Route {
    pub method: Method,
    pub template: PathTemplate,
    pub handler: Handler,
}

/// Route chosen for a request, with its captured path variables
pub struct Matched<'r> {
    pub route: &'r Route,
    pub params: PathParams,
}

/// Routes registered once at startup. Immutable afterwards.
#[derive(Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    pub fn from_table<I>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (Method, &'static str, Handler)>,
    {
        let mut registry = Self::default();
        for (method, template, handler) in entries {
            registry.register(method, template, handler)?;
        }
        Ok(registry)
    }

    /// Two routes conflict when they share a method and a shape
    pub fn register(&mut self, method: Method, template: &str, handler: Handler) -> Result<(), RegistryError> {
        let template = PathTemplate::parse(template)?;

        if let Some(existing) = self
            .routes
            .iter()
            .find(|route| route.method == method && route.template.shape() == template.shape())
        {
            return Err(RegistryError::Duplicate {
                method,
                template: template.as_str().to_string(),
                existing: existing.template.as_str().to_string(),
            });
        }

        self.routes.push(Route {
            method,
            template,
            handler,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Pick the most specific route for `method` among those matching `path`.
    ///
    /// No matching template at all is 404; templates that match only under
    /// other methods are 405; a typed variable that fails to parse is 400.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<Matched<'_>, ApiError> {
        let segments = split_path(path);
        let candidates: Vec<&Route> = self
            .routes
            .iter()
            .filter(|route| route.template.matches(&segments))
            .collect();

        if candidates.is_empty() {
            return Err(ApiError::not_found("Path", "Route not found", path));
        }

        let route = candidates
            .into_iter()
            .filter(|route| &route.method == method)
            .max_by(|a, b| a.template.specificity().cmp(&b.template.specificity()))
            .ok_or_else(|| ApiError::method_not_allowed(format!("Method {} not allowed for {}", method, path)))?;

        let params = route.template.capture(&segments)?;
        Ok(Matched { route, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::ApiResponse;
    use serde_json::json;

    fn literal(_: &RequestScope<'_>) -> ApiResult {
        ApiResponse::ok(json!("literal"))
    }

    fn variable(_: &RequestScope<'_>) -> ApiResult {
        ApiResponse::ok(json!("variable"))
    }

    #[test]
    fn literal_segment_beats_variable() {
        // Registration order must not decide precedence
        let registry = RouteRegistry::from_table([
            (Method::GET, "/equipment/{equipment-id}", variable as Handler),
            (Method::GET, "/equipment/unused", literal as Handler),
        ])
        .unwrap();

        let matched = registry.resolve(&Method::GET, "/equipment/unused").unwrap();
        assert_eq!(matched.route.template.as_str(), "/equipment/unused");

        let matched = registry.resolve(&Method::GET, "/equipment/abc").unwrap();
        assert_eq!(matched.route.template.as_str(), "/equipment/{equipment-id}");
        assert_eq!(matched.params.text("equipment-id"), Some("abc"));
    }

    #[test]
    fn leftmost_literal_decides() {
        let registry = RouteRegistry::from_table([
            (Method::GET, "/{a}/b", variable as Handler),
            (Method::GET, "/a/{b}", literal as Handler),
        ])
        .unwrap();

        let matched = registry.resolve(&Method::GET, "/a/b").unwrap();
        assert_eq!(matched.route.template.as_str(), "/a/{b}");
    }

    #[test]
    fn duplicate_shapes_are_rejected() {
        let err = RouteRegistry::from_table([
            (Method::GET, "/users/{user-id}", variable as Handler),
            (Method::GET, "/users/{id:uuid}", variable as Handler),
        ])
        .err()
        .unwrap();
        assert!(matches!(err, RegistryError::Duplicate { .. }));

        // Same shape under another method is a different route
        assert!(RouteRegistry::from_table([
            (Method::GET, "/users/{user-id}", variable as Handler),
            (Method::DELETE, "/users/{user-id}", variable as Handler),
        ])
        .is_ok());
    }

    #[test]
    fn unknown_paths_and_methods() {
        let registry = RouteRegistry::from_table([(Method::GET, "/log/{log-id:uuid}", variable as Handler)]).unwrap();

        assert_eq!(registry.resolve(&Method::GET, "/nowhere").err().unwrap().status_code(), 404);
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            registry.resolve(&Method::POST, &format!("/log/{id}")).err().unwrap().status_code(),
            405
        );
        assert_eq!(registry.resolve(&Method::GET, "/log/not-a-uuid").err().unwrap().status_code(), 400);
    }
}
