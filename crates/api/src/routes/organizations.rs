//! Route definitions for the `/organizations` resource (admin only).

use axum::routing::get;
use axum::Router;

use crate::handlers::organizations;
use crate::state::AppState;

/// Routes mounted at `/organizations`.
///
/// ```text
/// GET    /                -> list_organizations
/// POST   /                -> create_organization
/// GET    /{id}            -> get_organization
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route("/{id}", get(organizations::get_organization))
}
