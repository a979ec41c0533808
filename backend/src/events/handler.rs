//! Scenario event scheduling
//!
//! The handler only answers "what fires this hour"; the engine applies the
//! effect and logs the resulting domain event.

use crate::events::types::{ScenarioEvent, ScheduledEvent};

/// Holds the configured schedule for a run
#[derive(Debug, Clone, Default)]
pub struct ScenarioEventHandler {
    events: Vec<ScheduledEvent>,
}

impl ScenarioEventHandler {
    pub fn new(events: Vec<ScheduledEvent>) -> Self {
        Self { events }
    }

    /// Events firing at `hour`, in configuration order
    pub fn events_for_hour(&self, hour: usize) -> Vec<&ScenarioEvent> {
        self.events
            .iter()
            .filter(|scheduled| scheduled.schedule.should_execute(hour))
            .map(|scheduled| &scheduled.event)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::EventSchedule;

    #[test]
    fn test_events_for_hour() {
        let handler = ScenarioEventHandler::new(vec![
            ScheduledEvent::media_inquiry_at(12, "Death toll"),
            ScheduledEvent {
                event: ScenarioEvent::MediaInquiry {
                    topic: "Hourly update".to_string(),
                },
                schedule: EventSchedule::Repeating {
                    start_hour: 0,
                    interval: 12,
                },
            },
        ]);

        assert_eq!(handler.events_for_hour(12).len(), 2);
        assert_eq!(handler.events_for_hour(24).len(), 1);
        assert!(handler.events_for_hour(5).is_empty());
    }
}
