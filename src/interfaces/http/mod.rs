//! HTTP REST API interfaces
//!
//! - `middleware`: authorization gate (bearer token + role check)
//! - `modules`: request handlers and DTOs per resource
//! - `common`: error bodies and the validating JSON extractor
//! - `router`: route table and OpenAPI document

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use middleware::{AuthGate, AuthenticatedUser};
pub use router::{create_router, ApiDoc, AppState};
