//! User DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{UserId, UserProfile};

/// User API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = i32)]
    pub id: UserId,
    pub username: String,
    pub role: String,
}

impl From<UserProfile> for UserResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            username: p.username,
            role: p.role,
        }
    }
}

/// Partial profile update. Omitted fields stay unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, message = "must be at least 3 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: Option<String>,
}
