//! Job lifecycle status.
//!
//! The per-action timestamp columns (`accepted_at`, `en_route_at`,
//! `arrived_at`, `completed_at`) are the audit trail; `jobs.status` is the
//! coarse label derived from the most recent action.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Coarse lifecycle status of a dispatched job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Created by the dispatch engine, awaiting vendor acceptance.
    Offered,
    Accepted,
    EnRoute,
    InProgress,
    Completed,
}

impl JobStatus {
    /// The persisted string representation (`jobs.status`).
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Offered => "OFFERED",
            JobStatus::Accepted => "ACCEPTED",
            JobStatus::EnRoute => "EN_ROUTE",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
        }
    }

    /// Parse a stored status string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "OFFERED" => Ok(JobStatus::Offered),
            "ACCEPTED" => Ok(JobStatus::Accepted),
            "EN_ROUTE" => Ok(JobStatus::EnRoute),
            "IN_PROGRESS" => Ok(JobStatus::InProgress),
            "COMPLETED" => Ok(JobStatus::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown job status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
