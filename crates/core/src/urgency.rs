//! Service-request urgency levels.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Reported urgency of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Emergency,
}

impl Urgency {
    /// The persisted string representation (`service_requests.urgency`).
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "LOW",
            Urgency::Medium => "MEDIUM",
            Urgency::High => "HIGH",
            Urgency::Emergency => "EMERGENCY",
        }
    }

    /// Parse a stored urgency string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "LOW" => Ok(Urgency::Low),
            "MEDIUM" => Ok(Urgency::Medium),
            "HIGH" => Ok(Urgency::High),
            "EMERGENCY" => Ok(Urgency::Emergency),
            other => Err(CoreError::Validation(format!("Unknown urgency '{other}'"))),
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
