//! Domain-level error type shared by the repository and API layers.

use crate::types::DbId;

/// A domain error raised by the workflow rules.
///
/// The API layer maps each variant onto an HTTP status and a stable
/// machine-readable code (see `dtg-api`'s `AppError`).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced entity does not exist (or is outside the caller's scope).
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The operation collides with existing state (e.g. a duplicate Job).
    #[error("{0}")]
    Conflict(String),

    /// No authenticated session.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller's role or ownership does not permit the operation.
    #[error("{0}")]
    Forbidden(String),

    /// The entity is in a state that forbids the operation
    /// (e.g. dispatching a cancelled request).
    #[error("{0}")]
    InvalidState(String),

    /// A status change not present in the transition table.
    ///
    /// Names the current status, the requested status, and the allowed
    /// target set so the rejection is diagnosable from the message alone.
    #[error("Invalid transition from {from} to {to}. Allowed: [{allowed}]")]
    InvalidTransition {
        from: String,
        to: String,
        allowed: String,
    },

    /// An unanticipated internal failure. The message is logged server-side
    /// and never surfaced verbatim to the caller.
    #[error("{0}")]
    Internal(String),
}
