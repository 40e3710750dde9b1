use async_trait::async_trait;

use super::{NewUser, User, UserId};
use crate::shared::DomainResult;

/// Persistence capability for users.
///
/// Every call touches a single record and is atomic on its own. Username
/// uniqueness is the implementation's job: when two writers race for the same
/// name exactly one wins and the other gets `DomainError::DuplicateUsername`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return it with its assigned id.
    async fn create(&self, user: NewUser) -> DomainResult<User>;

    async fn find_by_id(&self, id: UserId) -> DomainResult<User>;
    async fn find_by_username(&self, username: &str) -> DomainResult<User>;

    /// Write `username` and `password_hash` of the record with `user.id`.
    /// Other fields are left untouched.
    async fn update(&self, user: &User) -> DomainResult<()>;

    async fn delete(&self, id: UserId) -> DomainResult<()>;
}
