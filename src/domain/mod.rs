pub mod user;

pub use user::{NewUser, User, UserId, UserProfile, UserRepository, ADMIN_ROLE, DEFAULT_ROLE};

pub use crate::shared::{DomainError, DomainResult};
