use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Unsupported database driver: {0}")]
    UnsupportedDriver(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_version: String,
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreDriver {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub driver: StoreDriver,
    pub dsn: String,
    pub max_connections: u32,
    pub min_idle: u32,
    pub max_lifetime_secs: u64,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub get_all_timeout_ms: u64,
    pub request_timeout_secs: u64,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub enable_cors: bool,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub develop_mode: bool,
}

impl ApiConfig {
    pub fn get_all_timeout(&self) -> Duration {
        Duration::from_millis(self.get_all_timeout_ms)
    }
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// `APP_ENV` picks the preset, individual variables override it. Values that
    /// fail to parse keep the preset default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.app_name = lookup("APP_NAME").ok_or(ConfigError::Missing("APP_NAME"))?;
        config.app_version = lookup("APP_VERSION").ok_or(ConfigError::Missing("APP_VERSION"))?;

        config.database.driver = match lookup("DB_DRIVER_NAME").as_deref() {
            None | Some("postgres") | Some("pgx") => StoreDriver::Postgres,
            Some("memory") => StoreDriver::Memory,
            Some(other) => return Err(ConfigError::UnsupportedDriver(other.to_string())),
        };
        if let Some(dsn) = lookup("DB_DSN") {
            config.database.dsn = dsn;
        }
        if config.database.driver == StoreDriver::Postgres && config.database.dsn.is_empty() {
            return Err(ConfigError::Missing("DB_DSN"));
        }

        let config = config.with_overrides(&lookup);
        if config.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DB_MIN_IDLE") {
            self.database.min_idle = v.parse().unwrap_or(self.database.min_idle);
        }
        if let Some(v) = lookup("DB_MAX_LIFETIME_SECS") {
            self.database.max_lifetime_secs = v.parse().unwrap_or(self.database.max_lifetime_secs);
        }
        if let Some(v) = lookup("DB_IDLE_TIMEOUT_SECS") {
            self.database.idle_timeout_secs = v.parse().unwrap_or(self.database.idle_timeout_secs);
        }
        if let Some(v) = lookup("DB_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        // API overrides
        if let Some(v) = lookup("APP_PORT").or_else(|| lookup("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("GET_ALL_TIMEOUT_MS") {
            self.api.get_all_timeout_ms = v.parse().unwrap_or(self.api.get_all_timeout_ms);
        }
        if let Some(v) = lookup("API_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Logging overrides
        if let Some(v) = lookup("LOG_LEVEL") {
            if !v.trim().is_empty() {
                self.logging.level = v.to_ascii_lowercase();
            }
        }
        if let Some(v) = lookup("LOG_DEVELOP_MODE") {
            self.logging.develop_mode = v == "true";
        }

        self
    }

    pub fn development() -> Self {
        Self {
            app_name: String::new(),
            app_version: String::new(),
            environment: Environment::Development,
            database: DatabaseConfig {
                driver: StoreDriver::Postgres,
                dsn: String::new(),
                max_connections: 20,
                min_idle: 5,
                max_lifetime_secs: 60,
                idle_timeout_secs: 600,
                acquire_timeout_secs: 30,
            },
            api: ApiConfig {
                port: 8080,
                get_all_timeout_ms: 5_000,
                request_timeout_secs: 30,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                develop_mode: true,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            app_name: String::new(),
            app_version: String::new(),
            environment: Environment::Staging,
            database: DatabaseConfig {
                driver: StoreDriver::Postgres,
                dsn: String::new(),
                max_connections: 20,
                min_idle: 5,
                max_lifetime_secs: 60,
                idle_timeout_secs: 600,
                acquire_timeout_secs: 10,
            },
            api: ApiConfig {
                port: 8080,
                get_all_timeout_ms: 5_000,
                request_timeout_secs: 30,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                jwt_expiry_hours: 24,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                develop_mode: false,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            app_name: String::new(),
            app_version: String::new(),
            environment: Environment::Production,
            database: DatabaseConfig {
                driver: StoreDriver::Postgres,
                dsn: String::new(),
                max_connections: 50,
                min_idle: 5,
                max_lifetime_secs: 60,
                idle_timeout_secs: 600,
                acquire_timeout_secs: 5,
            },
            api: ApiConfig {
                port: 8080,
                get_all_timeout_ms: 5_000,
                request_timeout_secs: 15,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: false,
                jwt_expiry_hours: 4,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                develop_mode: false,
            },
        }
    }
}
