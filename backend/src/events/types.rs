//! Scenario event types for simulation configuration
//!
//! # Design Principles
//!
//! 1. **Determinism**: events are scheduled by hour, never by RNG
//! 2. **Self-contained**: events carry everything needed to surface them
//! 3. **Logged**: every firing becomes a domain [`Event`](crate::models::Event)

use serde::{Deserialize, Serialize};

/// A scripted happening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    /// A journalist asks about the incident. The inquiry stays pending until
    /// the operator responds or the next inquiry replaces it.
    MediaInquiry { topic: String },
}

/// When to fire a scenario event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventSchedule {
    /// Fire once at a specific hour
    OneTime { hour: usize },

    /// Fire every `interval` hours starting at `start_hour`
    Repeating { start_hour: usize, interval: usize },
}

impl EventSchedule {
    /// Check if this schedule fires at the given hour
    pub fn should_execute(&self, hour: usize) -> bool {
        match self {
            EventSchedule::OneTime { hour: at } => hour == *at,
            EventSchedule::Repeating {
                start_hour,
                interval,
            } => *interval > 0 && hour >= *start_hour && (hour - start_hour) % interval == 0,
        }
    }
}

/// A scenario event paired with its schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub event: ScenarioEvent,
    pub schedule: EventSchedule,
}

impl ScheduledEvent {
    pub fn media_inquiry_at(hour: usize, topic: &str) -> Self {
        Self {
            event: ScenarioEvent::MediaInquiry {
                topic: topic.to_string(),
            },
            schedule: EventSchedule::OneTime { hour },
        }
    }
}
