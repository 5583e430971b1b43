use crate::api::format::{EquipmentDetail, LogRef};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::router::RequestScope;

/// GET /equipment/{equipment-id} - one item with person names and its log, newest first
pub fn equipment_get(scope: &RequestScope<'_>) -> ApiResult {
    scope.require_user()?;
    let id = scope.path_uuid("equipment-id")?;

    let db = scope.storage().read();
    let item = db.equipment.get(&id).ok_or_else(|| ApiError::equipment_not_found(id))?;

    let detail = EquipmentDetail {
        id: item.id,
        equipment: &item.name,
        category: &item.category,
        guarantee_date: item.guarantee_date,
        is_used: item.is_used,
        price: item.price,
        location: &item.location,
        responsible_person: item.responsible_person,
        responsible_person_name: db.users.get(&item.responsible_person).map(|u| u.name.as_str()),
        user: item.user,
        user_name: item.user.and_then(|id| db.users.get(&id)).map(|u| u.name.as_str()),
        log: db.logs_for(&id).into_iter().map(LogRef::from).collect(),
    };

    ApiResponse::ok(detail)
}
