use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::api::format::{CategoryStat, PersonStat};
use crate::auth::Capability;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::router::RequestScope;
use crate::storage::Equipment;

#[derive(Default)]
struct Totals {
    count: usize,
    users: HashSet<Uuid>,
    price: Decimal,
}

impl Totals {
    fn add(&mut self, item: &Equipment) -> Result<(), ApiError> {
        self.price = self.price.checked_add(item.price).ok_or_else(|| {
            tracing::error!("price total overflowed at equipment {}", item.id);
            ApiError::internal_server_error("Price total is out of range")
        })?;
        self.count += 1;
        if let Some(user) = item.user {
            self.users.insert(user);
        }
        Ok(())
    }
}

/// GET /equipment/statistics?by-type=category|person - counts and price totals
pub fn equipment_statistics(scope: &RequestScope<'_>) -> ApiResult {
    scope.authorize(Capability::ManageAllEquipment)?;
    let by_type = scope
        .query("by-type")
        .ok_or_else(|| ApiError::bad_request("Missing 'by-type'"))?;

    let db = scope.storage().read();
    match by_type {
        "category" => {
            let mut groups: BTreeMap<&str, Totals> = BTreeMap::new();
            for item in db.equipment.list() {
                groups.entry(item.category.as_str()).or_default().add(item)?;
            }

            let stats: Vec<CategoryStat> = groups
                .into_iter()
                .map(|(category, totals)| CategoryStat {
                    category: category.to_string(),
                    count: totals.count,
                    count_users: totals.users.len(),
                    price: totals.price,
                })
                .collect();

            ApiResponse::ok(json!({ "StatisticsByCategory": stats }))
        }
        "person" => {
            let mut groups: BTreeMap<Uuid, Totals> = BTreeMap::new();
            for item in db.equipment.list() {
                groups.entry(item.responsible_person).or_default().add(item)?;
            }

            let mut stats: Vec<PersonStat> = groups
                .into_iter()
                .map(|(person, totals)| PersonStat {
                    person: db
                        .users
                        .get(&person)
                        .map(|u| u.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    count: totals.count,
                    count_users: totals.users.len(),
                    price: totals.price,
                })
                .collect();
            stats.sort_by(|a, b| b.person.cmp(&a.person));

            ApiResponse::ok(json!({ "StatisticsByPerson": stats }))
        }
        _ => Err(ApiError::bad_request("Invalid 'by-type'")),
    }
}
