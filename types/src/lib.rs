//! Core domain types for Crewbook.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod error_code;
mod resource;
mod startup;

pub use error_code::ErrorCode;
pub use resource::{Cause, Failure, Resource, ResourceError, combine};
pub use startup::StartDestination;
