//! Application configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables. Command-line overrides are applied by the binary.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8081
//!
//! [security]
//! jwt_secret = "..."
//! jwt_expiration_hours = 24
//! bcrypt_cost = 12
//!
//! [database]
//! path = "app.db"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::{DatabaseConfig, JwtConfig};
use crate::shared::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};

/// Secret used when nothing else is configured. Startup warns about it.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-env";

/// Longest accepted token lifetime: one year.
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 366;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file path, or `:memory:`
    pub path: String,
    /// Pool size. `None` picks a default suited to the path.
    pub max_connections: Option<u32>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "app.db".to_string(),
            max_connections: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Read a TOML file. Missing sections and keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the configuration from defaults, the optional file and the
    /// process environment (including a `.env` file when present).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_dotenv(dotenvy::dotenv())?;

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PORT`, `HOST`, `JWT_SECRET`, `JWT_EXPIRATION_HOURS`,
    /// `BCRYPT_COST`, `DB_PATH`, `LOG_LEVEL` and `LOG_FORMAT`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = parse_env("PORT", port)?;
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Some(hours) = get("JWT_EXPIRATION_HOURS") {
            self.security.jwt_expiration_hours = parse_env("JWT_EXPIRATION_HOURS", hours)?;
        }
        if let Some(cost) = get("BCRYPT_COST") {
            self.security.bcrypt_cost = parse_env("BCRYPT_COST", cost)?;
        }
        if let Some(path) = get("DB_PATH") {
            self.database.path = path;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = get("LOG_FORMAT") {
            self.logging.format = format;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret must not be empty".into()));
        }
        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&self.security.jwt_expiration_hours) {
            return Err(ConfigError::Invalid(format!(
                "security.jwt_expiration_hours must be within 1..={}",
                MAX_JWT_EXPIRATION_HOURS
            )));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "security.bcrypt_cost must be within {}..={}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }
        if self.database.path.is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }
        Ok(())
    }

    pub fn uses_default_secret(&self) -> bool {
        self.security.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_hours: self.security.jwt_expiration_hours,
        }
    }

    pub fn database_config(&self) -> DatabaseConfig {
        let mut db = DatabaseConfig::sqlite(&self.database.path);
        // An in-memory database only exists on its single connection.
        if let (Some(max), false) = (self.database.max_connections, self.database.path == ":memory:")
        {
            db.max_connections = max.max(1);
        }
        db
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn load_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}
