//! HTTP handler functions, one module per resource.

pub mod auth;
pub mod invoices;
pub mod jobs;
pub mod notifications;
pub mod organizations;
pub mod properties;
pub mod requests;
pub mod vendors;
