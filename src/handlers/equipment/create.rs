use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::check_user_exists;
use crate::api::format::EquipmentChanged;
use crate::auth::Capability;
use crate::middleware::{ApiResponse, ApiResult};
use crate::router::RequestScope;
use crate::storage::{Equipment, Inventory, CATEGORIES};
use crate::validation::{IsoDate, Nullable, Number, OneOf, Text, UuidText, ValidationContext};

/// Body of POST /equipment
#[derive(Debug)]
struct NewEquipment {
    name: String,
    category: String,
    guarantee_date: NaiveDate,
    price: Decimal,
    location: String,
    responsible_person: Option<Uuid>,
    user: Option<Uuid>,
    operation: String,
    text: String,
}

impl NewEquipment {
    fn probe(ctx: &mut ValidationContext, db: &Inventory) -> Option<Self> {
        let name = ctx.require("Equipment", Text::NON_BLANK);
        let category = ctx.require("Category", OneOf(CATEGORIES));
        let guarantee_date = ctx.require("GuaranteeDate", IsoDate);
        let price = ctx.require("Price", Number::NON_NEGATIVE);
        let location = ctx.require("Location", Text::NON_BLANK);

        let responsible_person = ctx.optional("ResponsiblePerson", UuidText);
        if let Some(Some(id)) = responsible_person {
            check_user_exists(ctx, db, "ResponsiblePerson", id);
        }

        let user = ctx.nullable("User", UuidText);
        if let Some(Nullable::Value(id)) = &user {
            check_user_exists(ctx, db, "User", *id);
        }

        let operation = ctx.require("Operation", Text::NON_BLANK);
        let text = ctx.optional("Text", Text::ANY);

        Some(Self {
            name: name?,
            category: category?,
            guarantee_date: guarantee_date?,
            price: price?,
            location: location?,
            responsible_person: responsible_person?,
            user: user?.into_patch().flatten(),
            operation: operation?,
            text: text?.unwrap_or_default(),
        })
    }
}

/// POST /equipment - register a new item and its first log entry
pub fn equipment_create(scope: &RequestScope<'_>) -> ApiResult {
    let caller = scope.authorize(Capability::ManageAllEquipment)?;

    let mut db = scope.storage().write();
    let input = scope.validate_json(|ctx| NewEquipment::probe(ctx, &db))?;

    let id = Uuid::new_v4();
    let mut item = Equipment {
        id,
        name: input.name,
        category: input.category,
        guarantee_date: input.guarantee_date,
        is_used: false,
        price: input.price,
        location: input.location,
        responsible_person: input.responsible_person.unwrap_or(caller.id),
        user: None,
    };
    item.assign_user(input.user);
    db.equipment.insert(item);

    let log_id = db.append_log(id, caller.id, input.operation, input.text);
    info!("Equipment {} created by {}", id, caller.id);

    ApiResponse::created(EquipmentChanged {
        equipment_id: id,
        log_id,
    })
}
