//! Auto-dispatch vendor matching.
//!
//! Pure selection logic over an in-memory candidate list; the dispatch
//! engine loads candidates (active vendors with their skill sets and open
//! job counts) and this module decides who gets the work. The load counts
//! are a snapshot taken at read time, so the fewest-open-jobs choice is a
//! best-effort load-balancing heuristic, not a consistency guarantee.

use crate::types::DbId;

/// An active vendor eligible for dispatch consideration.
#[derive(Debug, Clone)]
pub struct VendorCandidate {
    pub vendor_id: DbId,
    /// Skill category names as stored (arbitrary case and spacing).
    pub skills: Vec<String>,
    /// Count of this vendor's jobs with `completed_at IS NULL`.
    pub open_jobs: i64,
}

/// Normalize a category for comparison: trim, collapse internal runs of
/// whitespace to a single space, lowercase.
///
/// `"  Plumbing "` and `"PLUMBING"` match; `"hvac  repair"` and
/// `"HVAC Repair"` match.
pub fn normalize_category(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Check whether a candidate's skill set covers `category`
/// (case- and whitespace-insensitive).
pub fn skills_cover(candidate: &VendorCandidate, category: &str) -> bool {
    let wanted = normalize_category(category);
    candidate
        .skills
        .iter()
        .any(|s| normalize_category(s) == wanted)
}

/// Select the vendor to dispatch a request of `category` to.
///
/// Filters to candidates whose skills cover the category, then picks the
/// one with the fewest open jobs. Ties break on the lowest vendor id
/// (registration order), making the selection deterministic for a given
/// candidate snapshot.
///
/// Returns `None` when no candidate covers the category; the caller then
/// queues the request for manual dispatch.
pub fn select_vendor(category: &str, candidates: &[VendorCandidate]) -> Option<DbId> {
    candidates
        .iter()
        .filter(|c| skills_cover(c, category))
        .min_by_key(|c| (c.open_jobs, c.vendor_id))
        .map(|c| c.vendor_id)
}
