//! Vendor-driven job actions and their sequencing rules.
//!
//! Each action stamps one milestone column on the job and may mirror a
//! status onto the parent service request. Actions are guarded against
//! out-of-order calls (a job cannot `complete` before it was `accept`ed and
//! `arrive`d), but repeating an action is allowed and idempotent: the
//! timestamp is overwritten and the parent request status is left untouched
//! when it is already at the target.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job_status::JobStatus;
use crate::request_status::RequestStatus;
use crate::types::Timestamp;

/// An action a vendor (or admin) applies to a job via `PATCH /jobs/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    Accept,
    #[serde(rename = "enroute")]
    EnRoute,
    Arrive,
    Complete,
}

impl JobAction {
    /// The wire name of the action (`{"action": "..."}` in the PATCH body).
    pub fn as_str(self) -> &'static str {
        match self {
            JobAction::Accept => "accept",
            JobAction::EnRoute => "enroute",
            JobAction::Arrive => "arrive",
            JobAction::Complete => "complete",
        }
    }

    /// Parse a wire action name.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "accept" => Ok(JobAction::Accept),
            "enroute" => Ok(JobAction::EnRoute),
            "arrive" => Ok(JobAction::Arrive),
            "complete" => Ok(JobAction::Complete),
            other => Err(CoreError::Validation(format!(
                "Unknown job action '{other}'. Must be one of: accept, enroute, arrive, complete"
            ))),
        }
    }

    /// The job status this action establishes.
    pub fn resulting_status(self) -> JobStatus {
        match self {
            JobAction::Accept => JobStatus::Accepted,
            JobAction::EnRoute => JobStatus::EnRoute,
            JobAction::Arrive => JobStatus::InProgress,
            JobAction::Complete => JobStatus::Completed,
        }
    }

    /// The status mirrored onto the parent service request, if any.
    ///
    /// `enroute` is a vendor-side milestone with no externally visible
    /// request status change.
    pub fn request_status_effect(self) -> Option<RequestStatus> {
        match self {
            JobAction::Accept => Some(RequestStatus::Accepted),
            JobAction::EnRoute => None,
            JobAction::Arrive => Some(RequestStatus::InProgress),
            JobAction::Complete => Some(RequestStatus::Completed),
        }
    }
}

impl std::fmt::Display for JobAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The milestone timestamps already stamped on a job.
///
/// Once set, a milestone is never cleared by any action; this struct only
/// answers "has it happened yet" for sequencing checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobMilestones {
    pub accepted_at: Option<Timestamp>,
    pub en_route_at: Option<Timestamp>,
    pub arrived_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Validate that `action` is applied in order given the job's milestones.
///
/// - `enroute` and `arrive` require a prior `accept`.
/// - `complete` requires a prior `arrive`.
/// - Repeating any action is allowed (its own milestone being set satisfies
///   the prerequisite chain).
pub fn validate_sequence(action: JobAction, milestones: &JobMilestones) -> Result<(), CoreError> {
    let ok = match action {
        JobAction::Accept => true,
        JobAction::EnRoute | JobAction::Arrive => milestones.accepted_at.is_some(),
        JobAction::Complete => milestones.arrived_at.is_some(),
    };
    if ok {
        Ok(())
    } else {
        Err(CoreError::InvalidState(format!(
            "Job action '{action}' is out of order: the job has not reached the required prior milestone"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stamped() -> Option<Timestamp> {
        Some(Utc::now())
    }

    // -----------------------------------------------------------------------
    // Wire parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parse_round_trips_every_action() {
        for action in [
            JobAction::Accept,
            JobAction::EnRoute,
            JobAction::Arrive,
            JobAction::Complete,
        ] {
            assert_eq!(JobAction::parse(action.as_str()).unwrap(), action);
        }
    }

    #[test]
    fn parse_rejects_unknown_action() {
        let err = JobAction::parse("pause").unwrap_err();
        assert!(err.to_string().contains("Unknown job action"));
    }

    // -----------------------------------------------------------------------
    // Status effects
    // -----------------------------------------------------------------------

    #[test]
    fn accept_mirrors_accepted_onto_request() {
        assert_eq!(
            JobAction::Accept.request_status_effect(),
            Some(RequestStatus::Accepted)
        );
    }

    #[test]
    fn enroute_has_no_request_effect() {
        assert_eq!(JobAction::EnRoute.request_status_effect(), None);
    }

    #[test]
    fn arrive_mirrors_in_progress_onto_request() {
        assert_eq!(
            JobAction::Arrive.request_status_effect(),
            Some(RequestStatus::InProgress)
        );
    }

    #[test]
    fn complete_mirrors_completed_onto_request() {
        assert_eq!(
            JobAction::Complete.request_status_effect(),
            Some(RequestStatus::Completed)
        );
    }

    // -----------------------------------------------------------------------
    // Sequencing guards
    // -----------------------------------------------------------------------

    #[test]
    fn accept_is_always_in_order() {
        assert!(validate_sequence(JobAction::Accept, &JobMilestones::default()).is_ok());
    }

    #[test]
    fn enroute_before_accept_rejected() {
        let err =
            validate_sequence(JobAction::EnRoute, &JobMilestones::default()).unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn arrive_before_accept_rejected() {
        assert!(validate_sequence(JobAction::Arrive, &JobMilestones::default()).is_err());
    }

    #[test]
    fn complete_before_arrive_rejected() {
        let milestones = JobMilestones {
            accepted_at: stamped(),
            ..Default::default()
        };
        assert!(validate_sequence(JobAction::Complete, &milestones).is_err());
    }

    #[test]
    fn full_sequence_in_order_passes() {
        let mut milestones = JobMilestones::default();
        assert!(validate_sequence(JobAction::Accept, &milestones).is_ok());
        milestones.accepted_at = stamped();

        assert!(validate_sequence(JobAction::EnRoute, &milestones).is_ok());
        milestones.en_route_at = stamped();

        assert!(validate_sequence(JobAction::Arrive, &milestones).is_ok());
        milestones.arrived_at = stamped();

        assert!(validate_sequence(JobAction::Complete, &milestones).is_ok());
    }

    #[test]
    fn enroute_is_optional_before_arrive() {
        // Vendors sometimes skip the en-route ping entirely.
        let milestones = JobMilestones {
            accepted_at: stamped(),
            ..Default::default()
        };
        assert!(validate_sequence(JobAction::Arrive, &milestones).is_ok());
    }

    #[test]
    fn repeating_complete_stays_in_order() {
        let milestones = JobMilestones {
            accepted_at: stamped(),
            en_route_at: stamped(),
            arrived_at: stamped(),
            completed_at: stamped(),
        };
        assert!(validate_sequence(JobAction::Complete, &milestones).is_ok());
    }
}
