//! # Auth Service
//!
//! Credential and session service: users register with a username and
//! password, log in for a signed bearer token, manage their own profile and,
//! with the `admin` role, delete accounts.
//!
//! ## Architecture
//!
//! - **domain**: user model and the storage contract
//! - **application**: account operations (register, login, profile, delete)
//! - **infrastructure**: bcrypt hashing, JWT tokens, SQLite and in-memory stores
//! - **interfaces**: HTTP API with the authorization gate and OpenAPI document
//! - **shared**: errors, input checks and shutdown signalling

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::AppConfig;
pub use server::{build_app, init_tracing, ServerHandle, ServerOptions};
