pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmUserRepository;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migrator::Migrator;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./app.db?mode=rwc")
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// Let the pool close idle or old connections. Off for in-memory
    /// databases, whose contents die with the connection.
    pub recycle_connections: bool,
}

/// Idle and lifetime limit for connections that must never be replaced.
const PINNED_CONNECTION_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::sqlite("app.db")
    }
}

impl DatabaseConfig {
    /// Create config for an SQLite file, created on first use.
    /// `:memory:` yields a private in-memory database.
    pub fn sqlite(path: &str) -> Self {
        if path == ":memory:" {
            return Self::in_memory();
        }
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
            max_connections: 5,
            recycle_connections: true,
        }
    }

    /// Every pooled connection to `sqlite::memory:` would open its own empty
    /// database, so the pool is pinned to a single connection that is never
    /// recycled.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            recycle_connections: false,
        }
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .max_connections(self.max_connections)
            .min_connections(1)
            .sqlx_logging(false);

        if !self.recycle_connections {
            options
                .idle_timeout(PINNED_CONNECTION_LIFETIME)
                .max_lifetime(PINNED_CONNECTION_LIFETIME);
        }
        options
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}", config.url);

    let db = Database::connect(config.connect_options()).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Apply all pending schema migrations
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    info!("Running database migrations...");
    Migrator::up(db, None).await?;
    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_path_becomes_rwc_url() {
        let config = DatabaseConfig::sqlite("data/app.db");
        assert_eq!(config.url, "sqlite://data/app.db?mode=rwc");
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn memory_path_pins_single_connection() {
        let config = DatabaseConfig::sqlite(":memory:");
        assert_eq!(config.url, "sqlite::memory:");
        assert_eq!(config.max_connections, 1);
    }

    #[test]
    fn memory_connection_is_never_recycled() {
        let options = DatabaseConfig::in_memory().connect_options();
        assert_eq!(options.get_idle_timeout(), Some(PINNED_CONNECTION_LIFETIME));
        assert_eq!(options.get_max_lifetime(), Some(PINNED_CONNECTION_LIFETIME));

        let options = DatabaseConfig::sqlite("data/app.db").connect_options();
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[tokio::test]
    async fn memory_database_keeps_schema_across_idle_periods() {
        use sea_orm::{ConnectionTrait, Statement};

        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&db).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        let backend = db.get_database_backend();
        db.execute(Statement::from_string(
            backend,
            "INSERT INTO users (username, password_hash) VALUES ('alice', 'x')",
        ))
        .await
        .unwrap();
        let row = db
            .query_one(Statement::from_string(backend, "SELECT COUNT(*) AS n FROM users"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.try_get::<i64>("", "n").unwrap(), 1);
    }
}
