//! Job entity models and DTOs.

use dtg_core::error::CoreError;
use dtg_core::job_action::JobMilestones;
use dtg_core::job_status::JobStatus;
use dtg_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `jobs` table.
///
/// Milestone timestamps are append-only: each is set by its action and
/// never cleared, forming the audit trail of the visit.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub service_request_id: DbId,
    pub vendor_id: DbId,
    pub organization_id: DbId,
    pub status: String,
    pub accepted_at: Option<Timestamp>,
    pub en_route_at: Option<Timestamp>,
    pub arrived_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub vendor_notes: Option<String>,
    pub total_labour_hours: Option<f64>,
    pub total_materials_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Parse the stored status string into the closed enum.
    pub fn status(&self) -> Result<JobStatus, CoreError> {
        JobStatus::parse(&self.status)
    }

    /// The job's stamped milestones, for action sequencing checks.
    pub fn milestones(&self) -> JobMilestones {
        JobMilestones {
            accepted_at: self.accepted_at,
            en_route_at: self.en_route_at,
            arrived_at: self.arrived_at,
            completed_at: self.completed_at,
        }
    }
}

/// A row from the `job_notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobNote {
    pub id: DbId,
    pub job_id: DbId,
    pub author_user_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// A row from the `job_materials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobMaterial {
    pub id: DbId,
    pub job_id: DbId,
    pub description: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub created_at: Timestamp,
}

/// A row from the `job_photos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobPhoto {
    pub id: DbId,
    pub job_id: DbId,
    pub url: String,
    pub photo_type: String,
    pub created_at: Timestamp,
}

/// DTO for the vendor/admin `PATCH /api/v1/jobs/{id}` update.
///
/// `action` drives the lifecycle; the remaining fields are free-form
/// side-effect updates applied with no validation beyond type coercion.
#[derive(Debug, Deserialize)]
pub struct UpdateJob {
    pub action: Option<String>,
    pub vendor_notes: Option<String>,
    pub total_labour_hours: Option<f64>,
    pub total_materials_cost: Option<f64>,
    pub total_cost: Option<f64>,
}

/// DTO for adding a note via `POST /api/v1/jobs/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobNote {
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
}

/// DTO for adding a material line via `POST /api/v1/jobs/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobMaterial {
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    pub quantity: f64,
    pub unit_cost: f64,
}

/// DTO for adding a photo via `POST /api/v1/jobs/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobPhoto {
    #[validate(url(message = "url must be a valid URL"))]
    pub url: String,
    pub photo_type: Option<String>,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    /// Filter by stored status string (e.g. `OFFERED`).
    pub status: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
