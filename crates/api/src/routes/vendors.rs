//! Route definitions for the `/vendors` resource (admin only).

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::vendors;
use crate::state::AppState;

/// Routes mounted at `/vendors`.
///
/// ```text
/// GET    /                             -> list_vendors
/// POST   /                             -> create_vendor
/// GET    /{id}                         -> get_vendor
/// PATCH  /{id}                         -> update_vendor
/// POST   /{id}/skills                  -> add_skill
/// DELETE /{id}/skills/{category}       -> remove_skill
/// POST   /{id}/credentials             -> add_credential
/// POST   /credentials/{id}/verify      -> verify_credential
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(vendors::list_vendors).post(vendors::create_vendor),
        )
        .route(
            "/{id}",
            get(vendors::get_vendor).patch(vendors::update_vendor),
        )
        .route("/{id}/skills", post(vendors::add_skill))
        .route("/{id}/skills/{category}", delete(vendors::remove_skill))
        .route("/{id}/credentials", post(vendors::add_credential))
        .route("/credentials/{id}/verify", post(vendors::verify_credential))
}
