//! In-memory storage implementation

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{DomainError, DomainResult, NewUser, User, UserId, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    /// Last id handed out; only ever grows so ids are not reused.
    last_id: UserId,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

/// In-memory user store for development and testing.
///
/// A single lock covers the whole table so the username check and the write
/// happen atomically.
#[derive(Default)]
pub struct InMemoryUserRepository {
    tables: RwLock<Tables>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let mut tables = self.tables.write().await;

        if tables.username_taken(&new_user.username, None) {
            return Err(DomainError::DuplicateUsername(new_user.username));
        }

        tables.last_id += 1;
        let user = User {
            id: tables.last_id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<User> {
        self.tables
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::user_not_found("id", id))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<User> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| DomainError::user_not_found("username", username))
    }

    async fn update(&self, user: &User) -> DomainResult<()> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user.id) {
            return Err(DomainError::user_not_found("id", user.id));
        }
        if tables.username_taken(&user.username, Some(user.id)) {
            return Err(DomainError::DuplicateUsername(user.username.clone()));
        }

        if let Some(stored) = tables.users.get_mut(&user.id) {
            stored.username = user.username.clone();
            stored.password_hash = user.password_hash.clone();
        }

        Ok(())
    }

    async fn delete(&self, id: UserId) -> DomainResult<()> {
        self.tables
            .write()
            .await
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::user_not_found("id", id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
        }
    }

    #[tokio::test]
    async fn ids_grow_past_deleted_records() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(new_user("alice")).await.unwrap();
        repo.delete(a.id).await.unwrap();
        let b = repo.create(new_user("alice")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn concurrent_registrations_have_one_winner() {
        let repo = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(new_user("alice")).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DomainError::DuplicateUsername(_)) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
    }

    #[tokio::test]
    async fn update_keeps_role_and_checks_uniqueness() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("alice")).await.unwrap();
        let mut bob = repo.create(new_user("bob")).await.unwrap();

        bob.username = "alice".to_string();
        assert!(matches!(
            repo.update(&bob).await,
            Err(DomainError::DuplicateUsername(_))
        ));

        bob.username = "robert".to_string();
        bob.role = "admin".to_string();
        repo.update(&bob).await.unwrap();

        let stored = repo.find_by_id(bob.id).await.unwrap();
        assert_eq!(stored.username, "robert");
        assert_eq!(stored.role, "user");
    }
}
