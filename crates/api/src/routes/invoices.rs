//! Route definitions for the `/invoices` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::invoices;
use crate::state::AppState;

/// Routes mounted at `/invoices`.
///
/// ```text
/// GET    /                -> list_invoices
/// POST   /                -> create_invoice (admin)
/// GET    /{id}            -> get_invoice
/// PATCH  /{id}            -> update_invoice (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route(
            "/{id}",
            get(invoices::get_invoice).patch(invoices::update_invoice),
        )
}
