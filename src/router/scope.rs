use std::collections::HashMap;

use uuid::Uuid;

use super::PathParams;
use crate::auth::{Capability, Permissions};
use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::storage::Storage;
use crate::validation::ValidationContext;

pub const PAGE_SIZES: [usize; 4] = [5, 10, 20, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Request body as read by the dispatcher. An oversized body is only
/// reported once a handler asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestBody<'a> {
    Read(&'a [u8]),
    TooLarge,
}

/// Everything a handler may look at for one request
pub struct RequestScope<'a> {
    pub user: Option<AuthenticatedUser>,
    pub params: PathParams,
    pub query: HashMap<String, String>,
    pub body: RequestBody<'a>,
    pub storage: &'a Storage,
}

impl<'a> RequestScope<'a> {
    pub fn permissions(&self) -> Permissions {
        Permissions::for_role(self.user.map(|user| user.role))
    }

    pub fn require_user(&self) -> Result<AuthenticatedUser, ApiError> {
        self.user.ok_or_else(ApiError::unauthenticated)
    }

    /// Anonymous callers are unauthenticated; known callers without the
    /// capability are forbidden.
    pub fn authorize(&self, capability: Capability) -> Result<AuthenticatedUser, ApiError> {
        let user = self.require_user()?;
        if !self.permissions().allows(capability) {
            return Err(ApiError::forbidden());
        }
        Ok(user)
    }

    pub fn storage(&self) -> &'a Storage {
        self.storage
    }

    /// Typed path variable. Registered templates guarantee it was parsed.
    pub fn path_uuid(&self, name: &str) -> Result<Uuid, ApiError> {
        self.params.uuid(name).ok_or_else(|| {
            tracing::error!("route template has no uuid variable '{}'", name);
            ApiError::internal_server_error("Internal server error")
        })
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn query_uuid(&self, name: &str) -> Result<Option<Uuid>, ApiError> {
        self.query(name)
            .map(|raw| Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid '{}'", name))))
            .transpose()
    }

    /// `page` (default 1) and `records-per-page` (default 10, one of 5/10/20/50)
    pub fn page(&self) -> Result<Page, ApiError> {
        let page = match self.query("page") {
            None => 1,
            Some(raw) => match raw.parse::<usize>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(ApiError::bad_request("Invalid 'page'")),
            },
        };

        let per_page = match self.query("records-per-page") {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => match raw.parse::<usize>() {
                Ok(size) if PAGE_SIZES.contains(&size) => size,
                _ => return Err(ApiError::bad_request("Invalid 'records-per-page'")),
            },
        };

        Ok(Page { page, per_page })
    }

    /// Parse the body and run `probe` over it, see [`ValidationContext::run`]
    pub fn validate_json<T>(&self, probe: impl FnOnce(&mut ValidationContext) -> Option<T>) -> Result<T, ApiError> {
        match self.body {
            RequestBody::Read(raw) => ValidationContext::run(raw, probe),
            RequestBody::TooLarge => Err(ApiError::bad_request("Request body too large")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub per_page: usize,
}

impl Page {
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip((self.page - 1).saturating_mul(self.per_page))
            .take(self.per_page)
            .collect()
    }
}
