use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::{check_user_exists, ensure_can_manage};
use crate::api::format::EquipmentChanged;
use crate::auth::Capability;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::router::RequestScope;
use crate::storage::{Equipment, Inventory, CATEGORIES};
use crate::validation::{IsoDate, Nullable, Number, OneOf, Text, UuidText, ValidationContext};

const DEFAULT_OPERATION: &str = "Update";

/// Body of PATCH /equipment/{id}. Absent fields keep their stored value.
#[derive(Debug)]
struct EquipmentPatch {
    name: Option<String>,
    category: Option<String>,
    guarantee_date: Option<NaiveDate>,
    price: Option<Decimal>,
    location: Option<String>,
    responsible_person: Option<Uuid>,
    /// `Some(None)` unassigns the current user
    user: Option<Option<Uuid>>,
    operation: String,
    text: String,
}

impl EquipmentPatch {
    fn probe(ctx: &mut ValidationContext, db: &Inventory) -> Option<Self> {
        let name = ctx.optional("Equipment", Text::NON_BLANK);
        let category = ctx.optional("Category", OneOf(CATEGORIES));
        let guarantee_date = ctx.optional("GuaranteeDate", IsoDate);
        let price = ctx.optional("Price", Number::NON_NEGATIVE);
        let location = ctx.optional("Location", Text::NON_BLANK);

        let responsible_person = ctx.optional("ResponsiblePerson", UuidText);
        if let Some(Some(id)) = responsible_person {
            check_user_exists(ctx, db, "ResponsiblePerson", id);
        }

        let user = ctx.nullable("User", UuidText);
        if let Some(Nullable::Value(id)) = &user {
            check_user_exists(ctx, db, "User", *id);
        }

        let operation = ctx.optional("Operation", Text::NON_BLANK);
        let text = ctx.optional("Text", Text::ANY);

        Some(Self {
            name: name?,
            category: category?,
            guarantee_date: guarantee_date?,
            price: price?,
            location: location?,
            responsible_person: responsible_person?,
            user: user?.into_patch(),
            operation: operation?.unwrap_or_else(|| DEFAULT_OPERATION.to_string()),
            text: text?.unwrap_or_default(),
        })
    }

    fn apply(&self, item: &mut Equipment) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(date) = self.guarantee_date {
            item.guarantee_date = date;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(location) = &self.location {
            item.location = location.clone();
        }
        if let Some(person) = self.responsible_person {
            item.responsible_person = person;
        }
        if let Some(user) = self.user {
            item.assign_user(user);
        }
    }
}

/// PATCH /equipment/{equipment-id} - change some fields; logged only when something changed
pub fn equipment_patch(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageOwnEquipment)?;
    let id = scope.path_uuid("equipment-id")?;

    let mut db = scope.storage().write();
    let existing = db.equipment.get(&id).ok_or_else(|| ApiError::equipment_not_found(id))?;
    ensure_can_manage(scope.permissions(), caller, existing)?;

    let patch = scope.validate_json(|ctx| EquipmentPatch::probe(ctx, &db))?;

    let mut updated = existing.clone();
    patch.apply(&mut updated);
    if updated == *existing {
        return ApiResponse::no_content();
    }

    db.equipment.insert(updated);
    let log_id = db.append_log(id, caller.id, patch.operation, patch.text);
    info!("Equipment {} updated by {}", id, caller.id);

    ApiResponse::ok(EquipmentChanged {
        equipment_id: id,
        log_id,
    })
}
