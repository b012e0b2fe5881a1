//! Invoice status constants and validation.
//!
//! Invoices carry a flat status string; this module defines the accepted
//! values and the validation helper used by the DB and API layers.

/// Invoice drafted, not yet sent to the operator.
pub const INVOICE_DRAFT: &str = "DRAFT";

/// Invoice sent, awaiting payment.
pub const INVOICE_SENT: &str = "SENT";

/// Invoice paid in full.
pub const INVOICE_PAID: &str = "PAID";

/// Invoice past its due date without payment.
pub const INVOICE_OVERDUE: &str = "OVERDUE";

/// Invoice withdrawn.
pub const INVOICE_CANCELLED: &str = "CANCELLED";

/// All valid invoice status values.
pub const VALID_STATUSES: &[&str] = &[
    INVOICE_DRAFT,
    INVOICE_SENT,
    INVOICE_PAID,
    INVOICE_OVERDUE,
    INVOICE_CANCELLED,
];

/// Validate that an invoice status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), String> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid invoice status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))
    }
}
