//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod storage;

pub use crypto::{JwtConfig, PasswordHasher, TokenService};
pub use database::{init_database, run_migrations, DatabaseConfig, SeaOrmUserRepository};
pub use storage::InMemoryUserRepository;
