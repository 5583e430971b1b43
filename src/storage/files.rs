use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::{Inventory, Record, StorageError, Table};
use crate::config::StorageConfig;

/// Load all three CSV files. Any malformed row aborts the whole load.
pub fn load_inventory(paths: &StorageConfig) -> Result<Inventory, StorageError> {
    let inventory = Inventory {
        equipment: read_table(&paths.equipment_file)?,
        logs: read_table(&paths.log_file)?,
        users: read_table(&paths.users_file)?,
    };

    info!(
        "Loaded {} equipment items, {} log entries and {} users",
        inventory.equipment.len(),
        inventory.logs.len(),
        inventory.users.len()
    );

    Ok(inventory)
}

/// Write all three collections back to their files, replacing the contents
pub fn save_inventory(inventory: &Inventory, paths: &StorageConfig) -> Result<(), StorageError> {
    write_table(&paths.equipment_file, &inventory.equipment)?;
    write_table(&paths.log_file, &inventory.logs)?;
    write_table(&paths.users_file, &inventory.users)?;
    Ok(())
}

fn read_table<T>(path: &Path) -> Result<Table<T>, StorageError>
where
    T: Record + DeserializeOwned,
{
    let display = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|source| open_error(&display, source))?;

    reader
        .deserialize::<T>()
        .map(|row| {
            row.map_err(|source| StorageError::Csv {
                path: display.clone(),
                source,
            })
        })
        .collect()
}

fn write_table<T>(path: &Path, table: &Table<T>) -> Result<(), StorageError>
where
    T: Record + Serialize,
{
    let display = path.display().to_string();
    let csv_error = |source| StorageError::Csv {
        path: display.clone(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(|source| open_error(&display, source))?;

    // Stable order keeps diffs of the data files readable
    let mut rows = table.list();
    rows.sort_by_key(|row| row.id());
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }

    writer.flush().map_err(|source| StorageError::Io {
        path: display.clone(),
        source,
    })
}

fn open_error(path: &str, source: csv::Error) -> StorageError {
    StorageError::Open {
        path: path.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Equipment, Log, Role, User};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::fs;
    use std::str::FromStr;
    use uuid::Uuid;

    fn paths(dir: &Path) -> StorageConfig {
        StorageConfig {
            equipment_file: dir.join("equipment.csv"),
            log_file: dir.join("log.csv"),
            users_file: dir.join("users.csv"),
        }
    }

    #[test]
    fn inventory_survives_a_save_load_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());

        let owner = User {
            id: Uuid::new_v4(),
            name: "Olga".to_string(),
            registration_date_time: NaiveDate::from_ymd_opt(2023, 9, 1)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
            email: "olga@example.com".to_string(),
            position: "Head of IT".to_string(),
            role: Role::Admin,
        };
        let printer = Equipment {
            id: Uuid::new_v4(),
            name: "LaserJet, floor 2".to_string(),
            category: "Printer".to_string(),
            guarantee_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            is_used: false,
            price: Decimal::from_str("349.99").unwrap(),
            location: "Room 204".to_string(),
            responsible_person: owner.id,
            user: None,
        };
        let entry = Log {
            id: Uuid::new_v4(),
            equipment: printer.id,
            responsible_person: owner.id,
            operation: "Purchase".to_string(),
            text: "Delivered \"as is\"".to_string(),
            log_date_time: NaiveDate::from_ymd_opt(2024, 2, 10)
                .unwrap()
                .and_hms_opt(14, 5, 9)
                .unwrap(),
        };

        let mut inventory = Inventory::default();
        inventory.users.insert(owner.clone());
        inventory.equipment.insert(printer.clone());
        inventory.logs.insert(entry.clone());

        save_inventory(&inventory, &paths).unwrap();
        let loaded = load_inventory(&paths).unwrap();

        assert_eq!(loaded.users.get(&owner.id), Some(&owner));
        assert_eq!(loaded.equipment.get(&printer.id), Some(&printer));
        assert_eq!(loaded.logs.get(&entry.id), Some(&entry));
    }

    #[test]
    fn missing_role_column_defaults_to_user() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        let id = Uuid::new_v4();

        fs::write(
            &paths.users_file,
            format!("Id,Name,RegistrationDateTime,Email,Position\n{id},Ivan,2024-01-01T10:00:00,ivan@example.com,Clerk\n"),
        )
        .unwrap();

        let users: Table<User> = read_table(&paths.users_file).unwrap();
        assert_eq!(users.get(&id).map(|u| u.role), Some(Role::User));
    }

    #[test]
    fn malformed_rows_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(dir.path());
        fs::write(
            &paths.equipment_file,
            "Id,Equipment,Category,GuaranteeDate,IsUsed,Price,Location,ResponsiblePerson,User\nnot-a-uuid,Laptop,PC,2025-01-01,false,10,Room1,also-bad,\n",
        )
        .unwrap();

        let err = read_table::<Equipment>(&paths.equipment_file).unwrap_err();
        assert!(matches!(err, StorageError::Csv { .. }));
        assert!(err.to_string().contains("equipment.csv"));
    }

    #[test]
    fn missing_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table::<User>(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, StorageError::Open { .. }));
    }
}
