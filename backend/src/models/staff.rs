//! Staff model
//!
//! Surgeons and nurses accumulate fatigue while on duty and recover it while
//! resting. The fatigue curve itself lives in `resources::fatigue`; this type
//! only holds the counters and enforces the `[0, 100]` bound.

use serde::{Deserialize, Serialize};

/// Upper bound for staff fatigue
pub const MAX_FATIGUE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    Surgeon,
    Nurse,
}

/// A member of the clinical staff
///
/// # Example
/// ```
/// use triage_simulator_core_rs::models::staff::{StaffMember, StaffRole};
///
/// let s = StaffMember::new("S01".to_string(), "Dr. Okafor".to_string(), StaffRole::Surgeon);
/// assert_eq!(s.fatigue(), 0.0);
/// assert!(s.is_available());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    id: String,
    name: String,
    role: StaffRole,
    fatigue: f64,
    hours_worked_continuous: u32,
    total_hours_worked: u32,
    on_duty: bool,
    is_resting: bool,
    rest_hours_remaining: u32,
    current_patient: Option<String>,
    error_count: u32,
    breaks_taken: u32,
}

impl StaffMember {
    pub fn new(id: String, name: String, role: StaffRole) -> Self {
        Self {
            id,
            name,
            role,
            fatigue: 0.0,
            hours_worked_continuous: 0,
            total_hours_worked: 0,
            on_duty: true,
            is_resting: false,
            rest_hours_remaining: 0,
            current_patient: None,
            error_count: 0,
            breaks_taken: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> StaffRole {
        self.role
    }

    pub fn fatigue(&self) -> f64 {
        self.fatigue
    }

    pub fn hours_worked_continuous(&self) -> u32 {
        self.hours_worked_continuous
    }

    pub fn total_hours_worked(&self) -> u32 {
        self.total_hours_worked
    }

    pub fn on_duty(&self) -> bool {
        self.on_duty
    }

    pub fn is_resting(&self) -> bool {
        self.is_resting
    }

    pub fn rest_hours_remaining(&self) -> u32 {
        self.rest_hours_remaining
    }

    pub fn current_patient(&self) -> Option<&str> {
        self.current_patient.as_deref()
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn breaks_taken(&self) -> u32 {
        self.breaks_taken
    }

    /// On duty, not resting, not assigned to a patient
    pub fn is_available(&self) -> bool {
        self.on_duty && !self.is_resting && self.current_patient.is_none()
    }

    // ========================================================================
    // Mutators (resource manager only)
    // ========================================================================

    /// One worked hour: bumps counters and adds `increment` fatigue (capped)
    pub(crate) fn work_one_hour(&mut self, increment: f64) {
        self.hours_worked_continuous += 1;
        self.total_hours_worked += 1;
        self.fatigue = (self.fatigue + increment).clamp(0.0, MAX_FATIGUE);
    }

    /// One rested hour. Returns true when the rest period finished this hour.
    pub(crate) fn rest_one_hour(&mut self, recovery: f64) -> bool {
        self.fatigue = (self.fatigue - recovery).clamp(0.0, MAX_FATIGUE);
        self.rest_hours_remaining = self.rest_hours_remaining.saturating_sub(1);
        if self.rest_hours_remaining == 0 {
            self.is_resting = false;
            self.hours_worked_continuous = 0;
            return true;
        }
        false
    }

    pub(crate) fn start_rest(&mut self, hours: u32) {
        self.current_patient = None;
        self.is_resting = true;
        self.rest_hours_remaining = hours;
        self.breaks_taken += 1;
    }

    pub(crate) fn assign(&mut self, patient_id: String) {
        self.current_patient = Some(patient_id);
    }

    pub(crate) fn release(&mut self) -> Option<String> {
        self.current_patient.take()
    }

    pub(crate) fn record_error(&mut self) {
        self.error_count += 1;
    }

    #[cfg(test)]
    pub(crate) fn set_fatigue(&mut self, fatigue: f64) {
        self.fatigue = fatigue.clamp(0.0, MAX_FATIGUE);
    }
}
