//! Password hashing and token signing

pub mod jwt;
pub mod password;

pub use jwt::{JwtConfig, TokenError, TokenIdentity, TokenService};
pub use password::{HashError, PasswordHasher};
