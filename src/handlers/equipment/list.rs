use chrono::{NaiveDate, NaiveDateTime};

use crate::api::format::{EquipmentByTimeItem, EquipmentListItem, EquipmentUnusedItem};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::router::RequestScope;
use crate::storage::{Equipment, CATEGORIES};

/// GET /equipment - every item, sorted by category then id
pub fn equipment_list(scope: &RequestScope<'_>) -> ApiResult {
    scope.require_user()?;
    let page = scope.page()?;

    let db = scope.storage().read();
    let items: Vec<EquipmentListItem> = page
        .apply(sorted(db.equipment.list()))
        .into_iter()
        .map(EquipmentListItem::from)
        .collect();

    ApiResponse::ok(items)
}

/// GET /equipment/unused - items without a current user, optionally only some categories
pub fn equipment_unused(scope: &RequestScope<'_>) -> ApiResult {
    scope.require_user()?;
    let page = scope.page()?;
    let categories = parse_categories(scope.query("category"))?;

    let db = scope.storage().read();
    let unused = db
        .equipment
        .list()
        .into_iter()
        .filter(|item| !item.is_used)
        .filter(|item| categories.is_empty() || categories.contains(&item.category.as_str()))
        .collect();

    let items: Vec<EquipmentUnusedItem> = page
        .apply(sorted(unused))
        .into_iter()
        .map(EquipmentUnusedItem::from)
        .collect();

    ApiResponse::ok(items)
}

/// GET /equipment/by-time?time= - items whose guarantee ends on or before the given day
pub fn equipment_by_time(scope: &RequestScope<'_>) -> ApiResult {
    scope.require_user()?;
    let page = scope.page()?;
    let until = parse_time(scope.query("time"))?;

    let db = scope.storage().read();
    let expiring = db
        .equipment
        .list()
        .into_iter()
        .filter(|item| item.guarantee_date <= until)
        .collect();

    let items: Vec<EquipmentByTimeItem> = page
        .apply(sorted(expiring))
        .into_iter()
        .map(EquipmentByTimeItem::from)
        .collect();

    ApiResponse::ok(items)
}

fn sorted(mut items: Vec<&Equipment>) -> Vec<&Equipment> {
    items.sort_by(|a, b| a.category.cmp(&b.category).then(a.id.cmp(&b.id)));
    items
}

/// Comma separated category names. Blank entries are skipped; anything else
/// must be an exact category name.
fn parse_categories(raw: Option<&str>) -> Result<Vec<&str>, ApiError> {
    let mut categories = Vec::new();
    for token in raw.unwrap_or_default().split(',') {
        if token.trim().is_empty() {
            continue;
        }
        if !CATEGORIES.contains(&token) {
            return Err(ApiError::bad_request("Invalid 'category'"));
        }
        if !categories.contains(&token) {
            categories.push(token);
        }
    }
    Ok(categories)
}

/// Local date-time, fractional seconds ignored. Only the date part is used.
fn parse_time(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::bad_request("Missing 'time'"))?;
    let whole_seconds = raw.split('.').next().unwrap_or(raw);

    NaiveDateTime::parse_from_str(whole_seconds, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(whole_seconds, "%Y-%m-%dT%H:%M"))
        .map(|time| time.date())
        .map_err(|_| ApiError::bad_request("Invalid 'time'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_exact_and_deduplicated() {
        assert_eq!(parse_categories(None).unwrap(), Vec::<&str>::new());
        assert_eq!(parse_categories(Some("PC,,Phone,PC")).unwrap(), vec!["PC", "Phone"]);
        assert!(parse_categories(Some("PC, Phone")).is_err());
        assert!(parse_categories(Some("Laptop")).is_err());
    }

    #[test]
    fn time_keeps_only_the_date() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(parse_time(Some("2024-01-31T23:59:59.999")).unwrap(), day);
        assert_eq!(parse_time(Some("2024-01-31T08:00")).unwrap(), day);
        assert!(parse_time(Some("2024-01-31")).is_err());
        assert!(parse_time(None).is_err());
    }
}
