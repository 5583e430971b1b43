use tracing::info;
use uuid::Uuid;

use crate::api::format::{LogChanged, LogDetail};
use crate::auth::{Capability, Permissions};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedUser};
use crate::router::RequestScope;
use crate::storage::{Inventory, Log};
use crate::validation::{Text, UuidText, ValidationContext};

/// Body of POST /log
struct NewLog {
    equipment: Uuid,
    operation: String,
    text: String,
}

impl NewLog {
    fn probe(ctx: &mut ValidationContext, db: &Inventory) -> Option<Self> {
        let equipment = ctx.require("Equipment", UuidText);
        if let Some(id) = equipment {
            ctx.check("Equipment", db.equipment.contains(&id), "Equipment not found");
        }
        let operation = ctx.require("Operation", Text::NON_BLANK);
        let text = ctx.optional("Text", Text::ANY);

        Some(Self {
            equipment: equipment?,
            operation: operation?,
            text: text?.unwrap_or_default(),
        })
    }
}

/// Body of PATCH /log/{id}, and of PUT /log/{id} where both fields are required
struct LogEdit {
    operation: Option<String>,
    text: Option<String>,
}

impl LogEdit {
    fn probe_patch(ctx: &mut ValidationContext) -> Option<Self> {
        let operation = ctx.optional("Operation", Text::NON_BLANK);
        let text = ctx.optional("Text", Text::ANY);
        Some(Self {
            operation: operation?,
            text: text?,
        })
    }

    fn probe_put(ctx: &mut ValidationContext) -> Option<Self> {
        let operation = ctx.require("Operation", Text::NON_BLANK);
        let text = ctx.require("Text", Text::ANY);
        Some(Self {
            operation: Some(operation?),
            text: Some(text?),
        })
    }

    /// The timestamp of an entry never changes
    fn apply(self, log: &mut Log) {
        if let Some(operation) = self.operation {
            log.operation = operation;
        }
        if let Some(text) = self.text {
            log.text = text;
        }
    }
}

/// Full managers may edit any entry, everyone else only entries they wrote
fn ensure_can_edit(permissions: Permissions, caller: AuthenticatedUser, log: &Log) -> Result<(), ApiError> {
    if permissions.manage_all_equipment || log.responsible_person == caller.id {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

/// GET /log?equipment-id= - log entries, newest first
pub fn log_list(scope: &RequestScope<'_>) -> ApiResult {
    scope.require_user()?;
    let page = scope.page()?;
    let equipment = scope.query_uuid("equipment-id")?;

    let db = scope.storage().read();
    let mut logs: Vec<&Log> = db
        .logs
        .list()
        .into_iter()
        .filter(|log| equipment.map_or(true, |id| log.equipment == id))
        .collect();
    logs.sort_by(|a, b| b.log_date_time.cmp(&a.log_date_time).then(a.id.cmp(&b.id)));

    let body: Vec<LogDetail> = page.apply(logs).into_iter().map(LogDetail::from).collect();
    ApiResponse::ok(body)
}

/// GET /log/{log-id}
pub fn log_get(scope: &RequestScope<'_>) -> ApiResult {
    scope.require_user()?;
    let id = scope.path_uuid("log-id")?;

    let db = scope.storage().read();
    let log = db.logs.get(&id).ok_or_else(|| ApiError::log_not_found(id))?;
    ApiResponse::ok(LogDetail::from(log))
}

/// POST /log - append an entry for an existing item
pub fn log_create(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageOwnEquipment)?;

    let mut db = scope.storage().write();
    let input = scope.validate_json(|ctx| NewLog::probe(ctx, &db))?;

    let log_id = db.append_log(input.equipment, caller.id, input.operation, input.text);
    info!("Log entry {} added by {}", log_id, caller.id);

    ApiResponse::created(LogChanged { log_id })
}

/// PATCH /log/{log-id} - change operation and/or text
pub fn log_patch(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageOwnEquipment)?;
    let id = scope.path_uuid("log-id")?;

    let mut db = scope.storage().write();
    let existing = db.logs.get(&id).ok_or_else(|| ApiError::log_not_found(id))?;
    ensure_can_edit(scope.permissions(), caller, existing)?;

    let edit = scope.validate_json(LogEdit::probe_patch)?;
    let mut updated = existing.clone();
    edit.apply(&mut updated);
    if updated == *existing {
        return ApiResponse::no_content();
    }

    db.logs.insert(updated);
    info!("Log entry {} edited by {}", id, caller.id);
    ApiResponse::ok(LogChanged { log_id: id })
}

/// PUT /log/{log-id} - replace operation and text
pub fn log_put(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageOwnEquipment)?;
    let id = scope.path_uuid("log-id")?;

    let mut db = scope.storage().write();
    let existing = db.logs.get(&id).ok_or_else(|| ApiError::log_not_found(id))?;
    ensure_can_edit(scope.permissions(), caller, existing)?;

    let edit = scope.validate_json(LogEdit::probe_put)?;
    db.logs.update(&id, |log| edit.apply(log));
    info!("Log entry {} replaced by {}", id, caller.id);

    ApiResponse::no_content()
}

/// DELETE /log/{log-id}
pub fn log_delete(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageAllEquipment)?;
    let id = scope.path_uuid("log-id")?;

    let mut db = scope.storage().write();
    db.logs.remove(&id).ok_or_else(|| ApiError::log_not_found(id))?;
    info!("Log entry {} deleted by {}", id, caller.id);

    ApiResponse::ok(LogChanged { log_id: id })
}
