use clap::Parser;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Command line of the `equipment-api` binary. Every flag can also come from
/// the environment (or a `.env` file loaded before parsing).
#[derive(Debug, Clone, Parser)]
#[command(name = "equipment-api", version, about = "Equipment inventory HTTP API")]
pub struct Args {
    /// CSV file with the equipment items
    #[arg(long, env = "EQUIPMENT_FILE")]
    pub equipment_file: PathBuf,

    /// CSV file with the usage log
    #[arg(long, env = "LOG_FILE")]
    pub log_file: PathBuf,

    /// CSV file with the user accounts
    #[arg(long, env = "USERS_FILE")]
    pub users_file: PathBuf,

    /// HMAC secret used to verify bearer tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub secret: String,

    #[arg(long, env = "PORT")]
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// Lifetime of tokens issued by `TokenKeys::issue`
    pub token_ttl_hours: i64,
    pub enable_cors: bool,
}

/// Locations of the three flat files
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub equipment_file: PathBuf,
    pub log_file: PathBuf,
    pub users_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("port {0} is outside the allowed range 1024-65535")]
    PortOutOfRange(u16),

    #[error("the token secret must not be empty")]
    EmptySecret,

    #[error("{kind} file {path} does not exist")]
    MissingFile { kind: &'static str, path: PathBuf },
}

impl AppConfig {
    /// Build the effective configuration: per-environment defaults, then
    /// `API_*` / `SECURITY_*` overrides, then the command line.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let mut config = Self::for_environment(Environment::from_env()).with_env_overrides();

        config.server.port = args.port;
        config.security.jwt_secret = args.secret;
        config.storage = StorageConfig {
            equipment_file: args.equipment_file,
            log_file: args.log_file,
            users_file: args.users_file,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port < 1024 {
            return Err(ConfigError::PortOutOfRange(self.server.port));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let files = [
            ("equipment", &self.storage.equipment_file),
            ("log", &self.storage.log_file),
            ("users", &self.storage.users_file),
        ];
        for (kind, path) in files {
            if !path.is_file() {
                return Err(ConfigError::MissingFile {
                    kind,
                    path: path.clone(),
                });
            }
        }

        Ok(())
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key/value source. Unparsable values keep the default.
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = lookup("API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.server.max_request_size_bytes = v.parse().unwrap_or(self.server.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_TOKEN_TTL_HOURS") {
            self.security.token_ttl_hours = v.parse().unwrap_or(self.security.token_ttl_hours);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_hours: 24 * 7, // 1 week
                enable_cors: true,
            },
            storage: StorageConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_hours: 4,
                enable_cors: false,
            },
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            equipment_file: PathBuf::from("data/equipment.csv"),
            log_file: PathBuf::from("data/log.csv"),
            users_file: PathBuf::from("data/users.csv"),
        }
    }
}
