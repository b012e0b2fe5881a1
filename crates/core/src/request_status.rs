//! Service-request status lifecycle and admin transition table.
//!
//! Statuses are persisted as text; this module is the single authority for
//! parsing stored strings back into the closed [`RequestStatus`] enum and
//! for deciding which admin-driven transitions are legal. The job lifecycle
//! writes a subset of these statuses as well (see `job_action`), which is a
//! modeled overlap: admin intervention (forcing `Cancelled`) must remain
//! possible at any open stage.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Submitted,
    Triaging,
    NeedsClarification,
    ReadyToDispatch,
    Dispatched,
    Accepted,
    InProgress,
    Completed,
    Verified,
    Cancelled,
}

impl RequestStatus {
    /// The persisted string representation (`service_requests.status`).
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Submitted => "SUBMITTED",
            RequestStatus::Triaging => "TRIAGING",
            RequestStatus::NeedsClarification => "NEEDS_CLARIFICATION",
            RequestStatus::ReadyToDispatch => "READY_TO_DISPATCH",
            RequestStatus::Dispatched => "DISPATCHED",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::InProgress => "IN_PROGRESS",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Verified => "VERIFIED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parse a stored status string. Raw strings are never trusted as
    /// already validated; unknown values are a validation error.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "SUBMITTED" => Ok(RequestStatus::Submitted),
            "TRIAGING" => Ok(RequestStatus::Triaging),
            "NEEDS_CLARIFICATION" => Ok(RequestStatus::NeedsClarification),
            "READY_TO_DISPATCH" => Ok(RequestStatus::ReadyToDispatch),
            "DISPATCHED" => Ok(RequestStatus::Dispatched),
            "ACCEPTED" => Ok(RequestStatus::Accepted),
            "IN_PROGRESS" => Ok(RequestStatus::InProgress),
            "COMPLETED" => Ok(RequestStatus::Completed),
            "VERIFIED" => Ok(RequestStatus::Verified),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown request status '{other}'"
            ))),
        }
    }

    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        valid_transitions(self).is_empty()
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the set of valid target statuses reachable from `from`.
///
/// This is the admin-facing transition table. `Verified` and `Cancelled`
/// return an empty slice because they are terminal.
pub fn valid_transitions(from: RequestStatus) -> &'static [RequestStatus] {
    use RequestStatus::*;
    match from {
        Submitted => &[Triaging, NeedsClarification, ReadyToDispatch, Cancelled],
        Triaging => &[NeedsClarification, ReadyToDispatch, Cancelled],
        NeedsClarification => &[Triaging, ReadyToDispatch, Cancelled],
        ReadyToDispatch => &[Dispatched, Cancelled],
        Dispatched => &[Accepted, ReadyToDispatch, Cancelled],
        Accepted => &[InProgress, ReadyToDispatch, Cancelled],
        InProgress => &[Completed, Cancelled],
        Completed => &[Verified],
        Verified | Cancelled => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: RequestStatus, to: RequestStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a transition, returning [`CoreError::InvalidTransition`] naming
/// the current status, the requested status, and the allowed target set.
pub fn validate_transition(from: RequestStatus, to: RequestStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        let allowed = valid_transitions(from)
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(CoreError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
            allowed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RequestStatus::*;
    use super::*;

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn submitted_to_triaging() {
        assert!(can_transition(Submitted, Triaging));
    }

    #[test]
    fn submitted_to_needs_clarification() {
        assert!(can_transition(Submitted, NeedsClarification));
    }

    #[test]
    fn submitted_to_ready_to_dispatch() {
        assert!(can_transition(Submitted, ReadyToDispatch));
    }

    #[test]
    fn submitted_to_cancelled() {
        assert!(can_transition(Submitted, Cancelled));
    }

    #[test]
    fn triaging_to_ready_to_dispatch() {
        assert!(can_transition(Triaging, ReadyToDispatch));
    }

    #[test]
    fn needs_clarification_back_to_triaging() {
        assert!(can_transition(NeedsClarification, Triaging));
    }

    #[test]
    fn ready_to_dispatch_to_dispatched() {
        assert!(can_transition(ReadyToDispatch, Dispatched));
    }

    #[test]
    fn dispatched_to_accepted() {
        assert!(can_transition(Dispatched, Accepted));
    }

    #[test]
    fn dispatched_back_to_ready_to_dispatch() {
        // Admin can recall an un-accepted dispatch and re-queue it.
        assert!(can_transition(Dispatched, ReadyToDispatch));
    }

    #[test]
    fn accepted_to_in_progress() {
        assert!(can_transition(Accepted, InProgress));
    }

    #[test]
    fn accepted_back_to_ready_to_dispatch() {
        assert!(can_transition(Accepted, ReadyToDispatch));
    }

    #[test]
    fn in_progress_to_completed() {
        assert!(can_transition(InProgress, Completed));
    }

    #[test]
    fn completed_to_verified() {
        assert!(can_transition(Completed, Verified));
    }

    #[test]
    fn every_open_status_can_cancel() {
        for from in [
            Submitted,
            Triaging,
            NeedsClarification,
            ReadyToDispatch,
            Dispatched,
            Accepted,
            InProgress,
        ] {
            assert!(can_transition(from, Cancelled), "{from} must allow cancel");
        }
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn verified_has_no_transitions() {
        assert!(valid_transitions(Verified).is_empty());
        assert!(Verified.is_terminal());
    }

    #[test]
    fn cancelled_has_no_transitions() {
        assert!(valid_transitions(Cancelled).is_empty());
        assert!(Cancelled.is_terminal());
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn submitted_to_verified_invalid() {
        assert!(!can_transition(Submitted, Verified));
    }

    #[test]
    fn submitted_to_dispatched_invalid() {
        // Dispatch goes through READY_TO_DISPATCH or the dispatch engine.
        assert!(!can_transition(Submitted, Dispatched));
    }

    #[test]
    fn completed_to_cancelled_invalid() {
        // The only forward edge from Completed is operator verification.
        assert!(!can_transition(Completed, Cancelled));
    }

    #[test]
    fn in_progress_back_to_ready_to_dispatch_invalid() {
        assert!(!can_transition(InProgress, ReadyToDispatch));
    }

    #[test]
    fn cancelled_to_submitted_invalid() {
        assert!(!can_transition(Cancelled, Submitted));
    }

    #[test]
    fn no_self_transitions() {
        for from in [
            Submitted,
            Triaging,
            NeedsClarification,
            ReadyToDispatch,
            Dispatched,
            Accepted,
            InProgress,
            Completed,
            Verified,
            Cancelled,
        ] {
            assert!(!can_transition(from, from), "{from} -> {from} must be rejected");
        }
    }

    // -----------------------------------------------------------------------
    // validate_transition returns a descriptive error
    // -----------------------------------------------------------------------

    #[test]
    fn validate_transition_ok() {
        assert!(validate_transition(Completed, Verified).is_ok());
    }

    #[test]
    fn validate_transition_err_names_allowed_set() {
        let err = validate_transition(Submitted, Verified).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SUBMITTED"));
        assert!(msg.contains("VERIFIED"));
        assert!(msg.contains("TRIAGING"));
        assert!(msg.contains("NEEDS_CLARIFICATION"));
        assert!(msg.contains("READY_TO_DISPATCH"));
        assert!(msg.contains("CANCELLED"));
    }

    // -----------------------------------------------------------------------
    // String round-trip
    // -----------------------------------------------------------------------

    #[test]
    fn parse_round_trips_every_status() {
        for status in [
            Submitted,
            Triaging,
            NeedsClarification,
            ReadyToDispatch,
            Dispatched,
            Accepted,
            InProgress,
            Completed,
            Verified,
            Cancelled,
        ] {
            assert_eq!(RequestStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert!(RequestStatus::parse("EXPLODED").is_err());
    }

    #[test]
    fn parse_rejects_lowercase() {
        // Stored values are canonical uppercase; anything else is drift.
        assert!(RequestStatus::parse("submitted").is_err());
    }
}
