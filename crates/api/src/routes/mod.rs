//! Route tree assembly.

pub mod auth;
pub mod health;
pub mod invoices;
pub mod jobs;
pub mod notifications;
pub mod organizations;
pub mod properties;
pub mod requests;
pub mod vendors;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                              login (public)
///
/// /requests                                list, create (+auto-dispatch)
/// /requests/{id}                           get, admin patch
/// /requests/{id}/dispatch                  manual dispatch (admin, POST)
/// /requests/{id}/verify                    operator verification (POST)
///
/// /jobs                                    list (vendor-scoped)
/// /jobs/{id}                               get, lifecycle patch, append child
///
/// /vendors                                 list, create (admin only)
/// /vendors/{id}                            get, update
/// /vendors/{id}/skills                     add skill (POST)
/// /vendors/{id}/skills/{category}          remove skill (DELETE)
/// /vendors/{id}/credentials                add credential (POST)
/// /vendors/credentials/{id}/verify         verify credential (POST)
///
/// /organizations                           list, create (admin only)
/// /organizations/{id}                      get
///
/// /properties                              list, create (operator)
/// /properties/{id}                         get, update
///
/// /invoices                                list, create (admin)
/// /invoices/{id}                           get, update
///
/// /notifications                           list (auth required)
/// /notifications/{id}/read                 mark read (POST)
/// /notifications/read-all                  mark all read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/requests", requests::router())
        .nest("/jobs", jobs::router())
        .nest("/vendors", vendors::router())
        .nest("/organizations", organizations::router())
        .nest("/properties", properties::router())
        .nest("/invoices", invoices::router())
        .nest("/notifications", notifications::router())
}
