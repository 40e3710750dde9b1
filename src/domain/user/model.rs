/// Store-assigned identifier. Never reused after deletion.
pub type UserId = i32;

/// Role given to accounts registered without one.
pub const DEFAULT_ROLE: &str = "user";

/// Role allowed through admin-restricted routes.
pub const ADMIN_ROLE: &str = "admin";

/// User record as held by the store.
///
/// Not `Serialize`: the password hash must never reach a client.
/// Use [`UserProfile`] for anything leaving the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

/// Public projection of a user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub role: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}
