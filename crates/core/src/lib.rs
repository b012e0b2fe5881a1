//! Domain logic for the DispatchToGo field-service platform.
//!
//! This crate has zero internal dependencies so the rules here can be used
//! by the API layer, the repository layer, and any future worker or CLI
//! tooling without pulling in the database stack.

pub mod error;
pub mod invoice_status;
pub mod job_action;
pub mod job_status;
pub mod matching;
pub mod reference;
pub mod request_status;
pub mod roles;
pub mod types;
pub mod urgency;
