//! JSON shapes of successful responses

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::storage::{Equipment, Log, User};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EquipmentListItem<'a> {
    pub id: Uuid,
    pub equipment: &'a str,
    pub is_used: bool,
}

impl<'a> From<&'a Equipment> for EquipmentListItem<'a> {
    fn from(item: &'a Equipment) -> Self {
        Self {
            id: item.id,
            equipment: &item.name,
            is_used: item.is_used,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EquipmentUnusedItem<'a> {
    pub id: Uuid,
    pub equipment: &'a str,
}

impl<'a> From<&'a Equipment> for EquipmentUnusedItem<'a> {
    fn from(item: &'a Equipment) -> Self {
        Self {
            id: item.id,
            equipment: &item.name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EquipmentByTimeItem<'a> {
    pub id: Uuid,
    pub equipment: &'a str,
    pub guarantee_date: NaiveDate,
}

impl<'a> From<&'a Equipment> for EquipmentByTimeItem<'a> {
    fn from(item: &'a Equipment) -> Self {
        Self {
            id: item.id,
            equipment: &item.name,
            guarantee_date: item.guarantee_date,
        }
    }
}

/// One item with resolved person names and its audit trail
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EquipmentDetail<'a> {
    pub id: Uuid,
    pub equipment: &'a str,
    pub category: &'a str,
    pub guarantee_date: NaiveDate,
    pub is_used: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub location: &'a str,
    pub responsible_person: Uuid,
    pub responsible_person_name: Option<&'a str>,
    pub user: Option<Uuid>,
    pub user_name: Option<&'a str>,
    pub log: Vec<LogRef<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogRef<'a> {
    pub id: Uuid,
    pub responsible_person: Uuid,
    pub operation: &'a str,
    pub text: &'a str,
    pub log_date_time: NaiveDateTime,
}

impl<'a> From<&'a Log> for LogRef<'a> {
    fn from(log: &'a Log) -> Self {
        Self {
            id: log.id,
            responsible_person: log.responsible_person,
            operation: &log.operation,
            text: &log.text,
            log_date_time: log.log_date_time,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogDetail<'a> {
    pub id: Uuid,
    pub equipment: Uuid,
    pub responsible_person: Uuid,
    pub operation: &'a str,
    pub text: &'a str,
    pub log_date_time: NaiveDateTime,
}

impl<'a> From<&'a Log> for LogDetail<'a> {
    fn from(log: &'a Log) -> Self {
        Self {
            id: log.id,
            equipment: log.equipment,
            responsible_person: log.responsible_person,
            operation: &log.operation,
            text: &log.text,
            log_date_time: log.log_date_time,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryStat {
    pub category: String,
    pub count: usize,
    pub count_users: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PersonStat {
    pub person: String,
    pub count: usize,
    pub count_users: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserItem<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub registration_date_time: NaiveDateTime,
    pub email: &'a str,
    pub position: &'a str,
    pub role: &'static str,
}

impl<'a> From<&'a User> for UserItem<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id,
            name: &user.name,
            registration_date_time: user.registration_date_time,
            email: &user.email,
            position: &user.position,
            role: user.role.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EquipmentChanged {
    pub equipment_id: Uuid,
    pub log_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogChanged {
    pub log_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserChanged {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn prices_render_as_numbers() {
        let stat = CategoryStat {
            category: "PC".to_string(),
            count: 2,
            count_users: 1,
            price: Decimal::from_str("150.25").unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&stat).unwrap(),
            json!({"Category": "PC", "Count": 2, "CountUsers": 1, "Price": 150.25})
        );
    }

    #[test]
    fn change_bodies_use_pascal_case_ids() {
        let id = Uuid::new_v4();
        assert_eq!(
            serde_json::to_value(EquipmentChanged { equipment_id: id, log_id: id }).unwrap(),
            json!({"EquipmentId": id, "LogId": id})
        );
    }
}
