//! User aggregate
//!
//! Contains the User entity, its public projection, and the repository interface.

pub mod model;
pub mod repository;

mod dto_create;

pub use model::{User, UserId, UserProfile, ADMIN_ROLE, DEFAULT_ROLE};

pub use dto_create::NewUser;

pub use repository::UserRepository;
