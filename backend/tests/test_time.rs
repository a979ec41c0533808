//! Tests for SimClock

use triage_simulator_core_rs::SimClock;

#[test]
fn test_clock_new() {
    let clock = SimClock::new(72);
    assert_eq!(clock.current_hour(), 0);
    assert_eq!(clock.duration_hours(), 72);
    assert_eq!(clock.hours_remaining(), 72);
    assert!(!clock.is_complete());
}

#[test]
fn test_advance_hour_returns_new_hour() {
    let mut clock = SimClock::new(72);
    assert_eq!(clock.advance_hour(), 1);
    assert_eq!(clock.advance_hour(), 2);
    assert_eq!(clock.current_hour(), 2);
}

#[test]
fn test_complete_exactly_at_duration() {
    let mut clock = SimClock::new(3);

    clock.advance_hour();
    clock.advance_hour();
    assert!(!clock.is_complete());
    assert_eq!(clock.hours_remaining(), 1);

    clock.advance_hour();
    assert!(clock.is_complete());
    assert_eq!(clock.hours_remaining(), 0);
}

#[test]
fn test_advance_past_end_is_a_no_op() {
    let mut clock = SimClock::new(1);
    clock.advance_hour();
    assert_eq!(clock.advance_hour(), 1);
    assert_eq!(clock.current_hour(), 1);
}

#[test]
fn test_clock_serializes() {
    let mut clock = SimClock::new(24);
    clock.advance_hour();
    let json = serde_json::to_string(&clock).unwrap();
    let back: SimClock = serde_json::from_str(&json).unwrap();
    assert_eq!(back, clock);
}
