//! Time management for the simulation
//!
//! The emergency department runs in discrete one-hour steps over a fixed
//! run duration (72 hours by default). This module provides deterministic
//! hour advancement and the completion flag.

use serde::{Deserialize, Serialize};

/// Tracks the elapsed hour of a run
///
/// # Example
/// ```
/// use triage_simulator_core_rs::SimClock;
///
/// let mut clock = SimClock::new(72);
/// assert_eq!(clock.current_hour(), 0);
/// assert!(!clock.is_complete());
///
/// clock.advance_hour();
/// assert_eq!(clock.current_hour(), 1);
/// assert_eq!(clock.hours_remaining(), 71);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    /// Hours elapsed since the start of the incident
    current_hour: usize,
    /// Total length of the run in hours
    duration_hours: usize,
}

impl SimClock {
    /// Create a clock at hour 0
    ///
    /// # Panics
    /// Panics if `duration_hours` is zero. Configuration validation rejects
    /// that before an engine is built.
    pub fn new(duration_hours: usize) -> Self {
        assert!(duration_hours > 0, "duration_hours must be positive");
        Self {
            current_hour: 0,
            duration_hours,
        }
    }

    /// Advance by one hour, saturating at the end of the run
    ///
    /// Returns the new hour.
    pub fn advance_hour(&mut self) -> usize {
        if self.current_hour < self.duration_hours {
            self.current_hour += 1;
        }
        self.current_hour
    }

    /// Hours elapsed since the start of the run
    pub fn current_hour(&self) -> usize {
        self.current_hour
    }

    /// Configured run length
    pub fn duration_hours(&self) -> usize {
        self.duration_hours
    }

    pub fn hours_remaining(&self) -> usize {
        self.duration_hours - self.current_hour
    }

    /// True once the final hour has been simulated
    ///
    /// # Example
    /// ```
    /// use triage_simulator_core_rs::SimClock;
    ///
    /// let mut clock = SimClock::new(2);
    /// clock.advance_hour();
    /// clock.advance_hour();
    /// assert!(clock.is_complete());
    /// ```
    pub fn is_complete(&self) -> bool {
        self.current_hour >= self.duration_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "duration_hours must be positive")]
    fn test_zero_duration_panics() {
        SimClock::new(0);
    }

    #[test]
    fn test_advance_saturates_at_duration() {
        let mut clock = SimClock::new(3);
        for _ in 0..10 {
            clock.advance_hour();
        }
        assert_eq!(clock.current_hour(), 3);
        assert_eq!(clock.hours_remaining(), 0);
    }
}
