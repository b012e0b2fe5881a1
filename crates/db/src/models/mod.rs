//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Status/urgency columns are stored as text; the structs keep the raw
//! string and the application boundary parses it through the closed enums
//! in `dtg-core` before acting on it.

pub mod invoice;
pub mod job;
pub mod notification;
pub mod organization;
pub mod property;
pub mod service_request;
pub mod user;
pub mod vendor;
