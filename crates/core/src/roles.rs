//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_OPERATOR: &str = "operator";
pub const ROLE_VENDOR: &str = "vendor";
