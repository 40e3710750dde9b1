use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr,
};

use crate::domain::{DomainError, DomainResult, NewUser, User, UserId, UserRepository};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        password_hash: model.password_hash,
        role: model.role,
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || e.to_string().contains("UNIQUE constraint failed")
}

fn write_err(e: DbErr, username: &str) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::DuplicateUsername(username.to_string())
    } else {
        e.into()
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> DomainResult<User> {
        let username = new_user.username.clone();

        let model = user::ActiveModel {
            id: NotSet,
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role),
        }
        .insert(&self.db)
        .await
        .map_err(|e| write_err(e, &username))?;

        Ok(user_model_to_domain(model))
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<User> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(user_model_to_domain)
            .ok_or_else(|| DomainError::user_not_found("id", id))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<User> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .map(user_model_to_domain)
            .ok_or_else(|| DomainError::user_not_found("username", username))
    }

    async fn update(&self, existing: &User) -> DomainResult<()> {
        let active = user::ActiveModel {
            id: Unchanged(existing.id),
            username: Set(existing.username.clone()),
            password_hash: Set(existing.password_hash.clone()),
            role: NotSet,
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => {
                Err(DomainError::user_not_found("id", existing.id))
            }
            Err(e) => Err(write_err(e, &existing.username)),
        }
    }

    async fn delete(&self, id: UserId) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::user_not_found("id", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::{init_database, DatabaseConfig};

    async fn repo() -> SeaOrmUserRepository {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        crate::infrastructure::database::run_migrations(&db)
            .await
            .unwrap();
        SeaOrmUserRepository::new(db)
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role: "user".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_finds() {
        let repo = repo().await;
        let alice = repo.create(new_user("alice")).await.unwrap();
        let bob = repo.create(new_user("bob")).await.unwrap();

        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
        assert_eq!(repo.find_by_id(1).await.unwrap(), alice);
        assert_eq!(repo.find_by_username("bob").await.unwrap(), bob);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let repo = repo().await;
        let first = repo.create(new_user("alice")).await.unwrap();

        let err = repo.create(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateUsername(ref n) if n == "alice"));
        assert_eq!(repo.find_by_username("alice").await.unwrap(), first);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let repo = repo().await;
        assert!(repo.find_by_id(42).await.unwrap_err().is_not_found());
        assert!(repo.find_by_username("ghost").await.unwrap_err().is_not_found());
        assert!(repo.delete(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = repo().await;
        repo.create(new_user("alice")).await.unwrap();
        let bob = repo.create(new_user("bob")).await.unwrap();

        repo.delete(bob.id).await.unwrap();
        let carol = repo.create(new_user("carol")).await.unwrap();

        assert!(carol.id > bob.id);
    }

    #[tokio::test]
    async fn update_writes_username_and_hash_only() {
        let repo = repo().await;
        let mut alice = repo
            .create(NewUser {
                role: "admin".to_string(),
                ..new_user("alice")
            })
            .await
            .unwrap();

        alice.username = "alicia".to_string();
        alice.password_hash = "$2b$04$other".to_string();
        alice.role = "user".to_string();
        repo.update(&alice).await.unwrap();

        let stored = repo.find_by_id(alice.id).await.unwrap();
        assert_eq!(stored.username, "alicia");
        assert_eq!(stored.password_hash, "$2b$04$other");
        assert_eq!(stored.role, "admin");
    }

    #[tokio::test]
    async fn update_to_taken_username_is_rejected() {
        let repo = repo().await;
        repo.create(new_user("alice")).await.unwrap();
        let mut bob = repo.create(new_user("bob")).await.unwrap();

        bob.username = "alice".to_string();
        let err = repo.update(&bob).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateUsername(_)));
    }

    #[tokio::test]
    async fn update_of_deleted_user_is_not_found() {
        let repo = repo().await;
        let alice = repo.create(new_user("alice")).await.unwrap();
        repo.delete(alice.id).await.unwrap();

        assert!(repo.update(&alice).await.unwrap_err().is_not_found());
    }
}
