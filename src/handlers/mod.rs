// handlers/mod.rs - the route table
//
// Every endpoint is one synchronous function over a `RequestScope`. Path
// variables typed `:uuid` are parsed before the handler runs.

pub mod equipment;
pub mod log;
pub mod ping;
pub mod users;

use axum::http::Method;

use crate::router::Handler;

fn route(method: Method, path: &'static str, handler: Handler) -> (Method, &'static str, Handler) {
    (method, path, handler)
}

pub fn routes() -> Vec<(Method, &'static str, Handler)> {
    vec![
        // Public
        route(Method::GET, "/ping", ping::ping),
        // Equipment
        route(Method::GET, "/equipment", equipment::equipment_list),
        route(Method::POST, "/equipment", equipment::equipment_create),
        route(Method::GET, "/equipment/unused", equipment::equipment_unused),
        route(Method::GET, "/equipment/by-time", equipment::equipment_by_time),
        route(Method::GET, "/equipment/statistics", equipment::equipment_statistics),
        route(Method::GET, "/equipment/{equipment-id:uuid}", equipment::equipment_get),
        route(Method::PATCH, "/equipment/{equipment-id:uuid}", equipment::equipment_patch),
        route(Method::DELETE, "/equipment/{equipment-id:uuid}", equipment::equipment_delete),
        // Log
        route(Method::GET, "/log", log::log_list),
        route(Method::POST, "/log", log::log_create),
        route(Method::GET, "/log/{log-id:uuid}", log::log_get),
        route(Method::PATCH, "/log/{log-id:uuid}", log::log_patch),
        route(Method::PUT, "/log/{log-id:uuid}", log::log_put),
        route(Method::DELETE, "/log/{log-id:uuid}", log::log_delete),
        // Users
        route(Method::GET, "/users", users::users_list),
        route(Method::POST, "/users", users::users_create),
        route(Method::PATCH, "/users/{user-id:uuid}", users::users_patch),
        route(Method::PUT, "/users/{user-id:uuid}", users::users_put),
        route(Method::DELETE, "/users/{user-id:uuid}", users::users_delete),
    ]
}
