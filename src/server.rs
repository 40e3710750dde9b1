//! Service runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: database connection, schema
//! migration, HTTP API and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, warn};

use crate::application::AccountService;
use crate::config::AppConfig;
use crate::domain::UserRepository;
use crate::infrastructure::{
    init_database, run_migrations, PasswordHasher, SeaOrmUserRepository, TokenService,
};
use crate::interfaces::http::{create_router, AppState, AuthGate};
use crate::shared::ShutdownSignal;

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// Wire the account service and authorization gate over an open database.
pub fn build_state(db: DatabaseConnection, config: &AppConfig) -> AppState {
    let repo: Arc<dyn UserRepository> = Arc::new(SeaOrmUserRepository::new(db));
    let tokens = Arc::new(TokenService::new(&config.jwt_config()));
    let hasher = PasswordHasher::new(config.security.bcrypt_cost);
    debug!(
        bcrypt_cost = hasher.cost(),
        token_ttl_hours = tokens.ttl_hours(),
        "Account service configured"
    );

    AppState {
        accounts: Arc::new(AccountService::new(repo, hasher, Arc::clone(&tokens))),
        gate: AuthGate::new(tokens),
    }
}

/// Build the complete HTTP application over an open database.
pub fn build_app(db: DatabaseConnection, config: &AppConfig) -> Router {
    create_router(build_state(db, config))
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running service.
///
/// ```rust,no_run
/// use auth_service::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the listener is bound to.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownSignal,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Connect to the database, migrate it and start serving.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;

        info!("Starting auth service...");

        if config.uses_default_secret() {
            warn!("Using the built-in JWT secret; set JWT_SECRET before deploying");
        }
        info!(
            "JWT configured with {}h token expiration",
            config.security.jwt_expiration_hours
        );

        // ── Database ───────────────────────────────────────────
        let db = init_database(&config.database_config()).await?;

        if opts.auto_migrate {
            run_migrations(&db).await?;
        } else {
            info!("Skipping database migrations");
        }

        // ── HTTP API ───────────────────────────────────────────
        let app = build_app(db.clone(), &config);

        let listener = tokio::net::TcpListener::bind(config.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP API listening on http://{}", local_addr);
        info!("OpenAPI document at http://{}/api-docs/openapi.json", local_addr);

        let shutdown = ShutdownSignal::new();
        let api_shutdown = shutdown.clone();
        let api_server = axum::serve(listener, app).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("HTTP API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("HTTP API server error: {}", e);
            }
        });

        Ok(Self {
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.listen_for_os_signals();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered.
    pub async fn wait(self) {
        match self.api_task.await {
            Ok(()) => info!("HTTP API stopped"),
            Err(e) => error!("HTTP API task panicked: {}", e),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("Shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the application config.
///
/// Call once at process startup. `RUST_LOG` takes precedence over
/// `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".into();
        config.server.port = 0;
        config.database.path = ":memory:".into();
        config.security.bcrypt_cost = crate::shared::MIN_BCRYPT_COST;
        config
    }

    #[tokio::test]
    async fn starts_and_shuts_down_cleanly() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            auto_migrate: true,
        })
        .await
        .unwrap();

        assert_ne!(handle.local_addr.port(), 0);
        assert!(tokio::net::TcpStream::connect(handle.local_addr).await.is_ok());
        assert!(handle.is_running());

        let signal = handle.shutdown_signal();
        handle.shutdown().await;
        assert!(signal.is_triggered());
    }
}
