mod create;
mod delete;
mod detail;
mod list;
mod statistics;
mod update;

pub use create::equipment_create;
pub use delete::equipment_delete;
pub use detail::equipment_get;
pub use list::{equipment_by_time, equipment_list, equipment_unused};
pub use statistics::equipment_statistics;
pub use update::equipment_patch;

use crate::auth::Permissions;
use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::storage::{Equipment, Inventory};
use crate::validation::ValidationContext;

/// Full managers may touch any item, owners only the items they are responsible for
fn ensure_can_manage(permissions: Permissions, caller: AuthenticatedUser, item: &Equipment) -> Result<(), ApiError> {
    let owns = permissions.manage_own_equipment && item.responsible_person == caller.id;
    if permissions.manage_all_equipment || owns {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

/// Record an error when a referenced user does not exist
fn check_user_exists(ctx: &mut ValidationContext, db: &Inventory, field: &str, id: uuid::Uuid) {
    ctx.check(field, db.users.contains(&id), "User not found");
}
