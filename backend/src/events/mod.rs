//! Scheduled scenario events
//!
//! Scenario events are scripted happenings that fire at configured hours
//! regardless of what the operator does (press inquiries today). They are
//! part of the run configuration, so they replay identically for a seed.

pub mod handler;
pub mod types;

pub use handler::ScenarioEventHandler;
pub use types::{EventSchedule, ScenarioEvent, ScheduledEvent};
