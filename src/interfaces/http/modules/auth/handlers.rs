//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{LoginRequest, LoginResponse, RegisterRequest};
use crate::application::AccountService;
use crate::interfaces::http::common::{ErrorBody, ValidatedJson};
use crate::interfaces::http::modules::users::UserResponse;
use crate::shared::DomainError;

#[utoipa::path(
    post,
    path = "/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error or username taken", body = ErrorBody)
    )
)]
pub async fn register(
    State(accounts): State<Arc<AccountService>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), DomainError> {
    let profile = accounts
        .register(&request.username, &request.password, request.role.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(profile.into())))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(accounts): State<Arc<AccountService>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, DomainError> {
    let token = accounts.login(&request.username, &request.password).await?;
    Ok(Json(LoginResponse { token }))
}
