//! API router with OpenAPI documentation

use std::sync::Arc;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::middleware::AuthGate;
use super::modules::request_id::request_id_middleware;
use super::modules::{auth, users};
use crate::application::AccountService;
use crate::domain::ADMIN_ROLE;

/// Process-wide state shared by all routes. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub gate: AuthGate,
}

impl FromRef<AppState> for Arc<AccountService> {
    fn from_ref(s: &AppState) -> Self {
        Arc::clone(&s.accounts)
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from POST /login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        users::get_profile,
        users::update_profile,
        users::delete_user,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Profile", description = "The caller's own account"),
        (name = "Users", description = "Admin-only user management"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the HTTP API.
///
/// `/register` and `/login` are public, `/profile` needs a valid token and
/// `DELETE /user/{id}` additionally needs the `admin` role.
pub fn create_router(state: AppState) -> Router {
    let gate = state.gate.clone();

    let public = Router::<AppState>::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/api-docs/openapi.json", get(openapi_json));

    let authenticated = gate.authenticated(Router::<AppState>::new().route(
        "/profile",
        get(users::get_profile).put(users::update_profile),
    ));

    let admin = gate.restricted(
        Router::<AppState>::new().route("/user/{id}", delete(users::delete_user)),
        &[ADMIN_ROLE],
    );

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        assert!(paths.contains(&"/register"));
        assert!(paths.contains(&"/login"));
        assert!(paths.contains(&"/profile"));
        assert!(paths.contains(&"/user/{id}"));
    }

    #[test]
    fn openapi_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
