//! Auth Service CLI
//!
//! ```sh
//! # Defaults, `.env` and environment variables only
//! auth-service
//!
//! # With a config file
//! auth-service --config /etc/auth-service/config.toml
//!
//! # Validate config without starting
//! auth-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use auth_service::{init_tracing, AppConfig, ServerHandle, ServerOptions};

/// Registration, login and role-gated account management over HTTP.
#[derive(Parser, Debug)]
#[command(name = "auth-service", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "AUTH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let mut config = AppConfig::load(cli.config.as_deref())?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        if let Some(ref path) = cli.config {
            println!("   Config file : {}", path.display());
        }
        println!("   Address     : {}", config.address());
        println!("   Database    : {}", config.database_config().url);
        println!("   Token TTL   : {}h", config.security.jwt_expiration_hours);
        println!("   Bcrypt cost : {}", config.security.bcrypt_cost);
        println!("   Log level   : {}", config.logging.level);
        if config.uses_default_secret() {
            println!("   Warning     : JWT secret is the built-in default");
        }
        return Ok(());
    }

    init_tracing(&config);
    if let Some(ref path) = cli.config {
        info!("Configuration loaded from {}", path.display());
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
