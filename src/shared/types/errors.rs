use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    /// Unknown username and wrong password both end up here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    /// Storage, hashing or signing fault. The message is for logs only.
    #[error("Internal: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn user_not_found(field: &'static str, value: impl ToString) -> Self {
        DomainError::NotFound {
            entity: "User",
            field,
            value: value.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Internal(format!("Database error: {}", e))
    }
}
