//! Authorization gate for Axum
//!
//! Two stages guard protected routes:
//!
//! 1. authentication: a `Bearer` token is required and validated, and the
//!    resulting [`AuthenticatedUser`] is stored in the request extensions;
//! 2. role check: the stored role must belong to the route's allowed set.
//!
//! The stages are only attachable through [`AuthGate`], which always puts
//! authentication in front of the role check.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::{from_fn_with_state, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::domain::UserId;
use crate::infrastructure::crypto::TokenService;
use crate::shared::DomainError;

/// Authentication state containing the token service
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
}

/// Identity of the caller, taken from a validated token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| DomainError::Unauthenticated("unauthorized".into()))
    }
}

/// Roles admitted by a restricted route
#[derive(Clone, Debug)]
struct AllowedRoles(Arc<[String]>);

impl AllowedRoles {
    fn new(roles: &[&str]) -> Self {
        Self(roles.iter().map(|r| r.to_string()).collect())
    }

    fn contains(&self, role: &str) -> bool {
        self.0.iter().any(|r| r == role)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let validated = match bearer_token(request.headers()) {
        Some(token) => auth_state.tokens.validate(token),
        None => {
            return DomainError::Unauthenticated("missing or invalid Authorization header".into())
                .into_response()
        }
    };

    match validated {
        Ok(identity) => {
            request.extensions_mut().insert(AuthenticatedUser {
                user_id: identity.user_id,
                role: identity.role,
            });
            next.run(request).await
        }
        Err(_) => DomainError::Unauthenticated("invalid token".into()).into_response(),
    }
}

async fn role_middleware(
    State(allowed): State<AllowedRoles>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match request.extensions().get::<AuthenticatedUser>() {
        Some(user) if allowed.contains(&user.role) => next.run(request).await,
        Some(_) => DomainError::Forbidden("insufficient role".into()).into_response(),
        None => DomainError::Forbidden("forbidden".into()).into_response(),
    }
}

/// Attaches the authorization stages to routers.
#[derive(Clone)]
pub struct AuthGate {
    state: AuthState,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self {
            state: AuthState { tokens },
        }
    }

    /// Require a valid bearer token on every route of `routes`.
    pub fn authenticated<S>(&self, routes: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        routes.route_layer(from_fn_with_state(self.state.clone(), auth_middleware))
    }

    /// Require a valid bearer token whose role is one of `roles`.
    pub fn restricted<S>(&self, routes: Router<S>, roles: &[&str]) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // Layers added later run first: authentication wraps the role check.
        let routes =
            routes.route_layer(from_fn_with_state(AllowedRoles::new(roles), role_middleware));
        self.authenticated(routes)
    }
}
