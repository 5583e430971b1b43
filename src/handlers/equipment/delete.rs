use tracing::info;

use super::ensure_can_manage;
use crate::api::format::EquipmentChanged;
use crate::auth::Capability;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::router::RequestScope;

const DELETE_OPERATION: &str = "Delete";

/// DELETE /equipment/{equipment-id} - remove an item, keeping its log with a final entry
pub fn equipment_delete(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageOwnEquipment)?;
    let id = scope.path_uuid("equipment-id")?;

    let mut db = scope.storage().write();
    let existing = db.equipment.get(&id).ok_or_else(|| ApiError::equipment_not_found(id))?;
    ensure_can_manage(scope.permissions(), caller, existing)?;

    db.equipment.remove(&id);
    let log_id = db.append_log(id, caller.id, DELETE_OPERATION, "");
    info!("Equipment {} deleted by {}", id, caller.id);

    ApiResponse::ok(EquipmentChanged {
        equipment_id: id,
        log_id,
    })
}
