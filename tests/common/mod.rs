#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use equipment_api::auth::TokenKeys;
use equipment_api::config::{AppConfig, Environment};
use equipment_api::state::AppState;
use equipment_api::storage::{Equipment, Inventory, Log, Role, Storage, User};

pub const SECRET: &str = "integration-test-secret";

/// In-memory application with a small, known data set
pub struct Fixture {
    pub state: AppState,
    pub admin: Uuid,
    pub manager: Uuid,
    pub clerk: Uuid,
    pub other_clerk: Uuid,
    /// PC, responsible: clerk, unused
    pub laptop: Uuid,
    /// Printer, responsible: admin, used by other_clerk
    pub printer: Uuid,
    /// Monitor, responsible: other_clerk, unused
    pub monitor: Uuid,
    /// Entry on the laptop written by clerk
    pub clerk_log: Uuid,
}

fn user(name: &str, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        registration_date_time: NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
        email: format!("{}@example.com", name.to_lowercase()),
        position: "Staff".to_string(),
        role,
    }
}

fn item(name: &str, category: &str, guarantee: (i32, u32, u32), price: &str, responsible: Uuid) -> Equipment {
    Equipment {
        id: Uuid::new_v4(),
        name: name.to_string(),
        category: category.to_string(),
        guarantee_date: NaiveDate::from_ymd_opt(guarantee.0, guarantee.1, guarantee.2).unwrap(),
        is_used: false,
        price: Decimal::from_str(price).unwrap(),
        location: "Room 1".to_string(),
        responsible_person: responsible,
        user: None,
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Same data set, with `adjust` applied to the development config
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let admin = user("Alice", Role::Admin);
        let manager = user("Mark", Role::Manager);
        let clerk = user("Carl", Role::User);
        let other_clerk = user("Olga", Role::User);

        let laptop = item("Laptop", "PC", (2025, 1, 1), "1200.50", clerk.id);
        let mut printer = item("LaserJet", "Printer", (2024, 6, 30), "300", admin.id);
        printer.assign_user(Some(other_clerk.id));
        let monitor = item("Dell 24", "Monitor", (2026, 3, 1), "180", other_clerk.id);

        let clerk_log = Log {
            id: Uuid::new_v4(),
            equipment: laptop.id,
            responsible_person: clerk.id,
            operation: "Purchase".to_string(),
            text: "Bought for the office".to_string(),
            log_date_time: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        };

        let fixture_ids = (
            admin.id,
            manager.id,
            clerk.id,
            other_clerk.id,
            laptop.id,
            printer.id,
            monitor.id,
            clerk_log.id,
        );

        let mut inventory = Inventory::default();
        for u in [admin, manager, clerk, other_clerk] {
            inventory.users.insert(u);
        }
        for e in [laptop, printer, monitor] {
            inventory.equipment.insert(e);
        }
        inventory.logs.insert(clerk_log);

        let mut config = AppConfig::for_environment(Environment::Development);
        config.security.jwt_secret = SECRET.to_string();
        adjust(&mut config);

        let state = AppState::new(
            Storage::new(inventory),
            TokenKeys::from_secret(SECRET).unwrap(),
            equipment_api::build_routes().unwrap(),
            config,
        );

        let (admin, manager, clerk, other_clerk, laptop, printer, monitor, clerk_log) = fixture_ids;
        Self {
            state,
            admin,
            manager,
            clerk,
            other_clerk,
            laptop,
            printer,
            monitor,
            clerk_log,
        }
    }

    pub fn token(&self, user: Uuid) -> String {
        let ttl = chrono::Duration::hours(self.state.config.security.token_ttl_hours);
        self.state.keys.issue(user, ttl).unwrap()
    }

    pub fn storage(&self) -> &Storage {
        &self.state.storage
    }

    /// Send a JSON request as `user` (anonymous when `None`)
    pub async fn send(&self, method: Method, uri: &str, user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
        let auth = user.map(|id| format!("Bearer {}", self.token(id)));
        let body = body.map(|v| v.to_string()).unwrap_or_default();
        self.send_raw(method, uri, auth.as_deref(), body).await
    }

    /// Send with an exact Authorization header and raw body text
    pub async fn send_raw(&self, method: Method, uri: &str, auth: Option<&str>, body: impl Into<Body>) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = equipment_api::app(self.state.clone())
            .oneshot(request.body(body.into()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: Option<Uuid>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, user, None).await
    }
}

/// Three CSV files in a temporary directory
pub struct DataFiles {
    pub dir: tempfile::TempDir,
    pub equipment: PathBuf,
    pub log: PathBuf,
    pub users: PathBuf,
}

impl DataFiles {
    /// Empty equipment and log, one admin account
    pub fn with_admin(admin: Uuid) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let files = Self {
            equipment: dir.path().join("equipment.csv"),
            log: dir.path().join("log.csv"),
            users: dir.path().join("users.csv"),
            dir,
        };

        std::fs::write(
            &files.equipment,
            "Id,Equipment,Category,GuaranteeDate,IsUsed,Price,Location,ResponsiblePerson,User\n",
        )?;
        std::fs::write(&files.log, "Id,Equipment,ResponsiblePerson,Operation,Text,LogDateTime\n")?;
        std::fs::write(
            &files.users,
            format!(
                "Id,Name,RegistrationDateTime,Email,Position,Role\n{},Root,2024-01-01T00:00:00,root@example.com,Admin,Admin\n",
                admin
            ),
        )?;
        Ok(files)
    }
}

/// The real binary, stopped when dropped
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub fn spawn(files: &DataFiles) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_equipment-api"));
        cmd.arg("--equipment-file")
            .arg(&files.equipment)
            .arg("--log-file")
            .arg(&files.log)
            .arg("--users-file")
            .arg(&files.users)
            .arg("--secret")
            .arg(SECRET)
            .arg("--port")
            .arg(port.to_string())
            .env("APP_ENV", "development")
            .env_remove("API_HOST")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;
        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/ping", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Ask the server to shut down gracefully and wait for it to exit
    #[cfg(unix)]
    pub async fn terminate(&mut self, timeout: Duration) -> Result<()> {
        let status = Command::new("kill")
            .arg("-TERM")
            .arg(self.child.id().to_string())
            .status()
            .context("failed to run kill")?;
        anyhow::ensure!(status.success(), "kill -TERM failed");

        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.child.try_wait()?.is_some() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not exit within {:?}", timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn contains(path: &Path, needle: &str) -> bool {
    std::fs::read_to_string(path).map(|text| text.contains(needle)).unwrap_or(false)
}
