//! Async domain logic for Crewbook.
//!
//! Producers here return [`crewbook_types::Resource`] rather than raising for
//! expected failures.

mod deadline;
mod roster;
mod startup;

pub use deadline::{FallbackReason, Settled, within_deadline};
pub use roster::RosterFile;
pub use startup::{
    DecisionBasis, StartDecision, StartupPolicy, UserDirectory, decide_start_destination,
};
