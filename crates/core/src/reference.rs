//! Human-readable reference numbers for service requests.
//!
//! Convention: `{PREFIX}-{YYYYMMDD}-{XXXX}` where `XXXX` is a zero-padded
//! 4-digit suffix, e.g. `REQ-20260807-4821`. The suffix is random; the
//! database enforces uniqueness and the caller retries on collision.

use chrono::NaiveDate;
use rand::Rng;

/// Default reference prefix for service requests.
pub const REQUEST_PREFIX: &str = "REQ";

/// Build a reference number from its parts.
pub fn format_reference(prefix: &str, date: NaiveDate, suffix: u16) -> String {
    format!("{prefix}-{}-{suffix:04}", date.format("%Y%m%d"))
}

/// Generate a reference number for `date` with a random 4-digit suffix.
pub fn generate_reference(prefix: &str, date: NaiveDate) -> String {
    let suffix: u16 = rand::rng().random_range(0..10_000);
    format_reference(prefix, date, suffix)
}
