//! Dispatch engine: assigns vendors to service requests.

pub mod dispatch;

pub use dispatch::DispatchEngine;
