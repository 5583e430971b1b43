use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Record;

/// Closed set of equipment categories accepted by the API
pub const CATEGORIES: &[&str] = &["PC", "Monitor", "Printer", "Phone", "Other"];

/// Account role. Handlers never branch on it directly; see `auth::Permissions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    User,
    Admin,
    Manager,
}

impl Role {
    pub const NAMES: &'static [&'static str] = &["User", "Admin", "Manager"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "User" => Some(Role::User),
            "Admin" => Some(Role::Admin),
            "Manager" => Some(Role::Manager),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Equipment {
    pub id: Uuid,
    #[serde(rename = "Equipment")]
    pub name: String,
    pub category: String,
    pub guarantee_date: NaiveDate,
    pub is_used: bool,
    pub price: Decimal,
    pub location: String,
    pub responsible_person: Uuid,
    pub user: Option<Uuid>,
}

impl Equipment {
    /// Assigns (or clears) the current user and keeps `is_used` in step with it
    pub fn assign_user(&mut self, user: Option<Uuid>) {
        self.user = user;
        self.is_used = user.is_some();
    }
}

impl Record for Equipment {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Audit log entry for one operation on an equipment item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Log {
    pub id: Uuid,
    pub equipment: Uuid,
    pub responsible_person: Uuid,
    pub operation: String,
    pub text: String,
    pub log_date_time: NaiveDateTime,
}

impl Record for Log {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub registration_date_time: NaiveDateTime,
    pub email: String,
    pub position: String,
    #[serde(default)]
    pub role: Role,
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }
}
