use chrono::Local;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::api::format::{UserChanged, UserItem};
use crate::auth::Capability;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::router::RequestScope;
use crate::storage::{Role, User};
use crate::validation::{Email, OneOf, Shape, Text, ValidationContext};

/// Role name parsed straight into a `Role`
#[derive(Debug, Clone, Copy)]
struct RoleName;

impl Shape for RoleName {
    type Output = Role;

    fn accept(&self, value: &Value) -> Result<Role, String> {
        let name = OneOf(Role::NAMES).accept(value)?;
        Role::parse(&name).ok_or_else(|| format!("Expected one of: {}", Role::NAMES.join(", ")))
    }
}

/// Body of POST /users and PUT /users/{id}
struct UserFields {
    name: String,
    email: String,
    position: String,
    role: Role,
}

impl UserFields {
    fn probe(ctx: &mut ValidationContext) -> Option<Self> {
        let name = ctx.require("Name", Text::NON_BLANK);
        let email = ctx.require("Email", Email);
        let position = ctx.require("Position", Text::NON_BLANK);
        let role = ctx.require("Role", RoleName);
        Some(Self {
            name: name?,
            email: email?,
            position: position?,
            role: role?,
        })
    }

    fn apply(self, user: &mut User) {
        user.name = self.name;
        user.email = self.email;
        user.position = self.position;
        user.role = self.role;
    }
}

/// Body of PATCH /users/{id}
struct UserPatch {
    name: Option<String>,
    email: Option<String>,
    position: Option<String>,
    role: Option<Role>,
}

impl UserPatch {
    fn probe(ctx: &mut ValidationContext) -> Option<Self> {
        let name = ctx.optional("Name", Text::NON_BLANK);
        let email = ctx.optional("Email", Email);
        let position = ctx.optional("Position", Text::NON_BLANK);
        let role = ctx.optional("Role", RoleName);
        Some(Self {
            name: name?,
            email: email?,
            position: position?,
            role: role?,
        })
    }

    fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(position) = self.position {
            user.position = position;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

/// GET /users - accounts sorted by name then id
pub fn users_list(scope: &RequestScope<'_>) -> ApiResult {
    scope.authorize(Capability::ManageUsers)?;

    let db = scope.storage().read();
    let mut users = db.users.list();
    users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    let body: Vec<UserItem> = users.into_iter().map(UserItem::from).collect();
    ApiResponse::ok(body)
}

/// POST /users - register an account
pub fn users_create(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageUsers)?;
    let input = scope.validate_json(UserFields::probe)?;

    let id = Uuid::new_v4();
    let user = User {
        id,
        name: input.name,
        registration_date_time: Local::now().naive_local(),
        email: input.email,
        position: input.position,
        role: input.role,
    };

    scope.storage().write().users.insert(user);
    info!("User {} created by {}", id, caller.id);

    ApiResponse::created(UserChanged { user_id: id })
}

/// PATCH /users/{user-id} - change some fields
pub fn users_patch(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageUsers)?;
    let id = scope.path_uuid("user-id")?;

    let mut db = scope.storage().write();
    let existing = db.users.get(&id).ok_or_else(|| ApiError::user_not_found(id))?;

    let patch = scope.validate_json(UserPatch::probe)?;
    let mut updated = existing.clone();
    patch.apply(&mut updated);
    if updated == *existing {
        return ApiResponse::no_content();
    }

    db.users.insert(updated);
    info!("User {} updated by {}", id, caller.id);
    ApiResponse::ok(UserChanged { user_id: id })
}

/// PUT /users/{user-id} - replace every editable field
pub fn users_put(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageUsers)?;
    let id = scope.path_uuid("user-id")?;

    let mut db = scope.storage().write();
    if !db.users.contains(&id) {
        return Err(ApiError::user_not_found(id));
    }

    let input = scope.validate_json(UserFields::probe)?;
    db.users.update(&id, |user| input.apply(user));
    info!("User {} replaced by {}", id, caller.id);

    ApiResponse::ok(UserChanged { user_id: id })
}

/// DELETE /users/{user-id} - remove an account and unassign it from equipment in use
pub fn users_delete(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageUsers)?;
    let id = scope.path_uuid("user-id")?;

    let mut db = scope.storage().write();
    if !db.users.contains(&id) {
        return Err(ApiError::user_not_found(id));
    }

    let responsible = db.equipment.list().iter().any(|item| item.responsible_person == id);
    if responsible {
        return Err(ApiError::bad_request("User is responsible for equipment"));
    }

    let in_use: Vec<Uuid> = db
        .equipment
        .list()
        .into_iter()
        .filter(|item| item.user == Some(id))
        .map(|item| item.id)
        .collect();
    for item in &in_use {
        db.equipment.update(item, |equipment| equipment.assign_user(None));
    }

    db.users.remove(&id);
    info!("User {} deleted by {}, {} items unassigned", id, caller.id, in_use.len());

    ApiResponse::ok(UserChanged { user_id: id })
}
