//! Route definitions for the `/jobs` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes mounted at `/jobs`.
///
/// ```text
/// GET    /                -> list_jobs
/// GET    /{id}            -> get_job (with notes/materials/photos)
/// PATCH  /{id}            -> update_job (lifecycle action + details)
/// POST   /{id}            -> append_job_child (note | material | photo)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(jobs::list_jobs)).route(
        "/{id}",
        get(jobs::get_job)
            .patch(jobs::update_job)
            .post(jobs::append_job_child),
    )
}
