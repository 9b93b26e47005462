pub mod handler;
pub mod trigger;

pub use handler::{CoordinatorState, SequenceOutcome, UpdateCoordinator, UpdateError};
pub use trigger::{CheckTrigger, TickOutcome};
