//! Route definitions for the `/requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::requests;
use crate::state::AppState;

/// Routes mounted at `/requests`.
///
/// ```text
/// GET    /                -> list_requests
/// POST   /                -> create_request (runs auto-dispatch)
/// GET    /{id}            -> get_request
/// PATCH  /{id}            -> update_request (admin, transition table)
/// POST   /{id}/dispatch   -> dispatch_request (admin)
/// POST   /{id}/verify     -> verify_request (operator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(requests::list_requests).post(requests::create_request),
        )
        .route(
            "/{id}",
            get(requests::get_request).patch(requests::update_request),
        )
        .route("/{id}/dispatch", post(requests::dispatch_request))
        .route("/{id}/verify", post(requests::verify_request))
}
