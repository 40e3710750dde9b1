//! Profile and user management API handlers
//!
//! Delegates to `AccountService` from the application/identity layer.
//! The caller's identity always comes from the authorization gate.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{UpdateProfileRequest, UserResponse};
use crate::application::{AccountService, ProfileChanges};
use crate::domain::UserId;
use crate::interfaces::http::common::{ErrorBody, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::DomainError;

#[utoipa::path(
    get,
    path = "/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody)
    )
)]
pub async fn get_profile(
    State(accounts): State<Arc<AccountService>>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, DomainError> {
    let profile = accounts.get_profile(user.user_id).await?;
    Ok(Json(profile.into()))
}

#[utoipa::path(
    put,
    path = "/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 204, description = "Profile updated"),
        (status = 400, description = "Nothing to update, invalid field or username taken", body = ErrorBody),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody)
    )
)]
pub async fn update_profile(
    State(accounts): State<Arc<AccountService>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<StatusCode, DomainError> {
    let changes = ProfileChanges {
        username: request.username,
        password: request.password,
    };

    accounts.update_profile(user.user_id, changes).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Id of the user to delete")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid id or delete failed", body = ErrorBody),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Caller is not an admin", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(accounts): State<Arc<AccountService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, DomainError> {
    let target: UserId = id
        .parse()
        .map_err(|_| DomainError::Validation(format!("invalid user id: {}", id)))?;

    accounts.delete_user(target).await.map_err(|e| match e {
        DomainError::NotFound { .. } => DomainError::Validation("delete failed: user not found".into()),
        other => other,
    })?;

    Ok(StatusCode::NO_CONTENT)
}
