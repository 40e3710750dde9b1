//! Identity module: registration, authentication and profile management
//!
//! Contains the `AccountService` which orchestrates the user-facing
//! use-cases on top of the user store, password hasher and token service.

pub mod service;

pub use service::{AccountService, ProfileChanges};
