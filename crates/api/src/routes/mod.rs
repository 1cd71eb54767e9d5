pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                 login (public)
/// /auth/refresh               refresh (public)
/// /auth/register              register (public)
/// /auth/change-password       change password (owner, admin)
/// /auth/logout                logout (requires auth)
///
/// /users/me                   get, partial update (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
}
