//! Account service: application-layer orchestration
//!
//! Registration, login and profile management. HTTP handlers are thin
//! wrappers that delegate here.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::domain::{
    DomainError, DomainResult, NewUser, UserId, UserProfile, UserRepository, DEFAULT_ROLE,
};
use crate::infrastructure::crypto::{HashError, PasswordHasher, TokenService};
use crate::shared::{validate_password, validate_username};

/// Fields a user may change on their own profile. Role is not among them.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

pub struct AccountService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    /// Hash checked against when the username is unknown, so both login
    /// failures cost one bcrypt verification.
    dummy_hash: OnceCell<String>,
}

impl AccountService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a new user. Empty or missing role becomes `"user"`.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Option<&str>,
    ) -> DomainResult<UserProfile> {
        validate_username(username)?;
        validate_password(password)?;

        let role = match role {
            Some(r) if !r.is_empty() => r,
            _ => DEFAULT_ROLE,
        };

        let password_hash = self.hash_password(password).await?;

        let user = self
            .repo
            .create(NewUser {
                username: username.to_string(),
                password_hash,
                role: role.to_string(),
            })
            .await?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "New user registered");
        Ok(user.into())
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check credentials and return a signed token.
    ///
    /// An unknown username and a wrong password produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<String> {
        let user = match self.repo.find_by_username(username).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                self.burn_verification(password).await;
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        self.verify_password(&user.password_hash, password).await?;

        let token = self.tokens.issue(user.id, &user.role).map_err(|e| {
            error!(user_id = user.id, "Token signing failed: {}", e);
            DomainError::Internal(e.to_string())
        })?;

        info!(user_id = user.id, "User logged in");
        Ok(token)
    }

    // ── Profile ─────────────────────────────────────────────────

    pub async fn get_profile(&self, user_id: UserId) -> DomainResult<UserProfile> {
        Ok(self.repo.find_by_id(user_id).await?.into())
    }

    /// Apply username and/or password changes. At least one must be given.
    pub async fn update_profile(&self, user_id: UserId, changes: ProfileChanges) -> DomainResult<()> {
        if changes.is_empty() {
            return Err(DomainError::Validation("nothing to update".into()));
        }
        if let Some(ref username) = changes.username {
            validate_username(username)?;
        }
        if let Some(ref password) = changes.password {
            validate_password(password)?;
        }

        let mut user = self.repo.find_by_id(user_id).await?;

        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password) = changes.password {
            user.password_hash = self.hash_password(&password).await?;
        }

        self.repo.update(&user).await?;

        info!(user_id, "Profile updated");
        Ok(())
    }

    /// Delete any account by id. Who may call this is decided upstream.
    pub async fn delete_user(&self, target_id: UserId) -> DomainResult<()> {
        self.repo.delete(target_id).await?;
        info!(user_id = target_id, "User deleted");
        Ok(())
    }

    // ── Hashing (off the async executor) ────────────────────────

    async fn hash_password(&self, password: &str) -> DomainResult<String> {
        let hasher = self.hasher;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| match e {
                HashError::TooLong => DomainError::Validation(e.to_string()),
                e => {
                    error!("Password hashing failed: {}", e);
                    DomainError::Internal(e.to_string())
                }
            })
    }

    async fn burn_verification(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hash_password("no-such-user-password"))
            .await;
        if let Ok(dummy) = dummy {
            let _ = self.verify_password(dummy, password).await;
        }
    }

    async fn verify_password(&self, password_hash: &str, password: &str) -> DomainResult<()> {
        let hasher = self.hasher;
        let password_hash = password_hash.to_string();
        let password = password.to_string();

        let result = tokio::task::spawn_blocking(move || hasher.verify(&password_hash, &password))
            .await
            .map_err(|e| DomainError::Internal(format!("Hashing task failed: {}", e)))?;

        match result {
            Ok(()) => Ok(()),
            Err(HashError::Mismatch) => Err(DomainError::InvalidCredentials),
            Err(e) => {
                warn!("Stored password hash rejected: {}", e);
                Err(DomainError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::JwtConfig;
    use crate::infrastructure::storage::InMemoryUserRepository;

    fn service() -> (AccountService, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 24,
        }));
        let service = AccountService::new(
            Arc::new(InMemoryUserRepository::new()),
            PasswordHasher::new(crate::shared::MIN_BCRYPT_COST),
            tokens.clone(),
        );
        (service, tokens)
    }

    #[tokio::test]
    async fn register_then_login_yields_matching_claims() {
        let (svc, tokens) = service();
        let profile = svc.register("alice", "secret1", None).await.unwrap();

        assert_eq!(
            profile,
            UserProfile {
                id: 1,
                username: "alice".into(),
                role: "user".into()
            }
        );

        let token = svc.login("alice", "secret1").await.unwrap();
        let identity = tokens.validate(&token).unwrap();
        assert_eq!(identity.user_id, profile.id);
        assert_eq!(identity.role, "user");
    }

    #[tokio::test]
    async fn empty_role_defaults_to_user() {
        let (svc, _) = service();
        let profile = svc.register("alice", "secret1", Some("")).await.unwrap();
        assert_eq!(profile.role, "user");

        let admin = svc.register("root", "secret1", Some("admin")).await.unwrap();
        assert_eq!(admin.role, "admin");
    }

    #[tokio::test]
    async fn register_validates_lengths() {
        let (svc, _) = service();
        assert!(matches!(
            svc.register("al", "secret1", None).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.register("alice", "12345", None).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_registration_leaves_first_user_intact() {
        let (svc, _) = service();
        let first = svc.register("alice", "secret1", None).await.unwrap();

        let err = svc
            .register("alice", "another", Some("admin"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateUsername(_)));

        assert_eq!(svc.get_profile(first.id).await.unwrap(), first);
        assert!(svc.login("alice", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let (svc, _) = service();
        svc.register("alice", "secret1", None).await.unwrap();

        let unknown = svc.login("nobody", "secret1").await.unwrap_err();
        let wrong = svc.login("alice", "wrong-pw").await.unwrap_err();

        assert!(matches!(unknown, DomainError::InvalidCredentials));
        assert!(matches!(wrong, DomainError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn update_with_no_fields_is_rejected() {
        let (svc, _) = service();
        let alice = svc.register("alice", "secret1", None).await.unwrap();

        let err = svc
            .update_profile(alice.id, ProfileChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m == "nothing to update"));
    }

    #[tokio::test]
    async fn password_only_update_rotates_credentials() {
        let (svc, _) = service();
        let alice = svc.register("alice", "secret1", None).await.unwrap();

        svc.update_profile(
            alice.id,
            ProfileChanges {
                username: None,
                password: Some("secret2".into()),
            },
        )
        .await
        .unwrap();

        assert_eq!(svc.get_profile(alice.id).await.unwrap().username, "alice");
        assert!(svc.login("alice", "secret2").await.is_ok());
        assert!(matches!(
            svc.login("alice", "secret1").await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn username_update_rejects_taken_name() {
        let (svc, _) = service();
        svc.register("alice", "secret1", None).await.unwrap();
        let bob = svc.register("bob", "secret1", None).await.unwrap();

        let err = svc
            .update_profile(
                bob.id,
                ProfileChanges {
                    username: Some("alice".into()),
                    password: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateUsername(_)));
    }

    #[tokio::test]
    async fn deleted_account_profile_is_not_found() {
        let (svc, tokens) = service();
        let alice = svc.register("alice", "secret1", None).await.unwrap();
        let token = svc.login("alice", "secret1").await.unwrap();

        svc.delete_user(alice.id).await.unwrap();

        // The token itself is still valid: validation is stateless.
        let identity = tokens.validate(&token).unwrap();
        assert!(svc.get_profile(identity.user_id).await.unwrap_err().is_not_found());
        assert!(svc.delete_user(alice.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn password_past_72_bytes_is_not_silently_truncated() {
        let (svc, _) = service();
        let prefix = "a".repeat(72);

        let err = svc
            .register("alice", &format!("{prefix}REAL-SECRET"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        svc.register("alice", &prefix, None).await.unwrap();
        assert!(svc.login("alice", &prefix).await.is_ok());
        assert!(matches!(
            svc.login("alice", &format!("{prefix}totally-different")).await,
            Err(DomainError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn unknown_user_login_still_checks_a_hash() {
        let (svc, _) = service();
        assert!(matches!(
            svc.login("nobody", "secret1").await,
            Err(DomainError::InvalidCredentials)
        ));
        assert!(svc.dummy_hash.get().is_some());
    }

    #[tokio::test]
    async fn unrepresentable_token_lifetime_fails_login_cleanly() {
        let tokens = Arc::new(TokenService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 10_000_000_000,
        }));
        let svc = AccountService::new(
            Arc::new(InMemoryUserRepository::new()),
            PasswordHasher::new(crate::shared::MIN_BCRYPT_COST),
            tokens,
        );
        svc.register("alice", "secret1", None).await.unwrap();

        assert!(matches!(
            svc.login("alice", "secret1").await,
            Err(DomainError::Internal(_))
        ));
    }
}
