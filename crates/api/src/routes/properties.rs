//! Route definitions for the `/properties` resource (operator).

use axum::routing::get;
use axum::Router;

use crate::handlers::properties;
use crate::state::AppState;

/// Routes mounted at `/properties`.
///
/// ```text
/// GET    /                -> list_properties
/// POST   /                -> create_property
/// GET    /{id}            -> get_property
/// PATCH  /{id}            -> update_property
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/{id}",
            get(properties::get_property).patch(properties::update_property),
        )
}
