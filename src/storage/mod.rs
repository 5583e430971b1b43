pub mod files;
pub mod models;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use uuid::Uuid;

pub use files::{load_inventory, save_inventory};
pub use models::{Equipment, Log, Role, User, CATEGORIES};

/// Errors from loading or saving the flat files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed row in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Anything stored in a `Table` is keyed by its own identifier
pub trait Record {
    fn id(&self) -> Uuid;
}

/// One keyed collection of records
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: HashMap<Uuid, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: HashMap::new() }
    }
}

impl<T: Record> Table<T> {
    pub fn get(&self, id: &Uuid) -> Option<&T> {
        self.rows.get(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.rows.contains_key(id)
    }

    pub fn list(&self) -> Vec<&T> {
        self.rows.values().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Inserts a record, replacing any previous record with the same id
    pub fn insert(&mut self, row: T) -> Option<T> {
        self.rows.insert(row.id(), row)
    }

    /// Applies `change` to the stored record and returns the updated value,
    /// or `None` when no record has this id.
    pub fn update(&mut self, id: &Uuid, change: impl FnOnce(&mut T)) -> Option<&T> {
        let row = self.rows.get_mut(id)?;
        change(row);
        Some(row)
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<T> {
        self.rows.remove(id)
    }
}

impl<T: Record> FromIterator<T> for Table<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().map(|row| (row.id(), row)).collect(),
        }
    }
}

/// The three collections, always locked together
#[derive(Debug, Default)]
pub struct Inventory {
    pub equipment: Table<Equipment>,
    pub logs: Table<Log>,
    pub users: Table<User>,
}

impl Inventory {
    /// Audit trail of one item, newest first (ties broken by id)
    pub fn logs_for(&self, equipment_id: &Uuid) -> Vec<&Log> {
        let mut logs: Vec<&Log> = self
            .logs
            .list()
            .into_iter()
            .filter(|log| &log.equipment == equipment_id)
            .collect();
        logs.sort_by(|a, b| b.log_date_time.cmp(&a.log_date_time).then(a.id.cmp(&b.id)));
        logs
    }

    /// Appends an audit entry stamped with the current local time and returns its id
    pub fn append_log(
        &mut self,
        equipment: Uuid,
        actor: Uuid,
        operation: impl Into<String>,
        text: impl Into<String>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.logs.insert(Log {
            id,
            equipment,
            responsible_person: actor,
            operation: operation.into(),
            text: text.into(),
            log_date_time: Local::now().naive_local(),
        });
        id
    }
}

/// Shared handle over the in-memory inventory.
///
/// A single coarse lock guards all three collections, so a handler that holds
/// the write guard for its whole "load, check, mutate" sequence sees no
/// interleaving from concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Storage {
    inner: Arc<RwLock<Inventory>>,
}

impl Storage {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(inventory)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Inventory> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Inventory> {
        self.inner.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            registration_date_time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            email: format!("{}@example.com", name.to_lowercase()),
            position: "Engineer".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn table_update_reports_missing_rows() {
        let mut users: Table<User> = Table::default();
        let alice = user("Alice");
        let id = alice.id;
        users.insert(alice);

        let renamed = users.update(&id, |u| u.name = "Alicia".to_string());
        assert_eq!(renamed.map(|u| u.name.as_str()), Some("Alicia"));
        assert!(users.update(&Uuid::new_v4(), |u| u.name.clear()).is_none());
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn logs_for_is_newest_first() {
        let mut inventory = Inventory::default();
        let item = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let base = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        for (day, op) in [(1, "Purchase"), (3, "Repair"), (2, "Move")] {
            inventory.logs.insert(Log {
                id: Uuid::new_v4(),
                equipment: item,
                responsible_person: actor,
                operation: op.to_string(),
                text: String::new(),
                log_date_time: base.with_day(day).unwrap().and_hms_opt(12, 0, 0).unwrap(),
            });
        }
        inventory.append_log(Uuid::new_v4(), actor, "Other item", "");

        let ops: Vec<&str> = inventory
            .logs_for(&item)
            .iter()
            .map(|log| log.operation.as_str())
            .collect();
        assert_eq!(ops, vec!["Repair", "Move", "Purchase"]);
    }

    #[test]
    fn storage_handles_share_state() {
        let storage = Storage::default();
        let other = storage.clone();
        other.write().users.insert(user("Bob"));
        assert_eq!(storage.read().users.len(), 1);
    }
}
