//! Resource Manager
//!
//! Owns every contended resource in the department:
//! - **Beds**: fixed pool, bed id → at most one patient
//! - **Staff**: surgeons and nurses with fatigue (see [`fatigue`])
//! - **Operating rooms**: one patient + one surgeon per room (see [`theatre`])
//! - **Blood bank**: per-type inventory with compatibility draws (see [`blood_bank`])
//!
//! # Critical Invariants
//!
//! 1. **Exclusivity**: a bed, room, surgeon or nurse is associated with at most
//!    one patient at any time
//! 2. **Atomicity**: a failed allocation leaves every resource unchanged
//! 3. **Bounds**: fatigue stays in `[0, 100]`, blood never goes negative
//!
//! # Example
//!
//! ```rust
//! use triage_simulator_core_rs::resources::ResourceManager;
//!
//! let mut rm = ResourceManager::builder().beds(2).surgeons(1).nurses(1).build();
//!
//! assert!(rm.assign_bed("B01", "P001"));
//! assert!(!rm.assign_bed("B01", "P002")); // occupied
//! assert_eq!(rm.available_beds(), vec!["B02"]);
//! assert_eq!(rm.free_bed("B01"), Some("P001".to_string()));
//! ```

pub mod blood_bank;
pub mod fatigue;
pub mod theatre;

pub use blood_bank::BloodBank;
pub use fatigue::{FatigueIncident, FatigueModel, FatigueReport};
pub use theatre::{CompletedSurgery, OperatingRoom};

use crate::models::blood::{BloodDraw, BloodType};
use crate::models::staff::{StaffMember, StaffRole};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

const SURGEON_NAMES: [&str; 8] = [
    "Okafor", "Lindqvist", "Tanaka", "Moreau", "Haddad", "Novak", "Brennan", "Castillo",
];
const NURSE_NAMES: [&str; 12] = [
    "Patel", "Kowalski", "Mensah", "Reyes", "Doyle", "Nakamura", "Ibrahim", "Larsen", "Santos",
    "Fischer", "Adeyemi", "Walsh",
];

/// Errors from resource primitives
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Unknown staff member: {0}")]
    UnknownStaff(String),

    #[error("Unknown operating room: {0}")]
    UnknownRoom(String),

    #[error("Staff member {0} is already resting")]
    AlreadyResting(String),

    #[error("Staff member {0} is not available")]
    StaffUnavailable(String),

    #[error("Staff member {0} is not a surgeon")]
    NotASurgeon(String),

    #[error("Operating room {0} is in use")]
    RoomBusy(String),

    #[error("Rest period must be at least one hour")]
    InvalidRestHours,

    #[error("Surgery duration must be at least one hour")]
    InvalidDuration,

    #[error("Blood request must be at least one unit")]
    InvalidUnits,

    #[error("Insufficient blood for {recipient}: requested {requested}, compatible stock {available}")]
    InsufficientBlood {
        recipient: BloodType,
        requested: u32,
        available: u32,
    },
}

/// Point-in-time resource counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub beds_total: usize,
    pub beds_free: usize,
    pub surgeons_total: usize,
    pub surgeons_available: usize,
    pub nurses_total: usize,
    pub nurses_available: usize,
    pub staff_resting: usize,
    pub rooms_total: usize,
    pub rooms_free: usize,
    pub average_fatigue: f64,
    pub blood_inventory: BTreeMap<BloodType, u32>,
    pub blood_units_consumed: u32,
}

/// Owner of beds, staff, operating rooms and blood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceManager {
    beds: BTreeMap<String, Option<String>>,
    staff: Vec<StaffMember>,
    rooms: Vec<OperatingRoom>,
    blood: BloodBank,
    fatigue_model: FatigueModel,
}

/// Builder for [`ResourceManager`]
#[derive(Debug, Clone, Default)]
pub struct ResourceManagerBuilder {
    beds: usize,
    surgeons: usize,
    nurses: usize,
    operating_rooms: usize,
    blood_supply: BTreeMap<BloodType, u32>,
    fatigue_model: FatigueModel,
}

impl ResourceManagerBuilder {
    pub fn beds(mut self, n: usize) -> Self {
        self.beds = n;
        self
    }

    pub fn surgeons(mut self, n: usize) -> Self {
        self.surgeons = n;
        self
    }

    pub fn nurses(mut self, n: usize) -> Self {
        self.nurses = n;
        self
    }

    pub fn operating_rooms(mut self, n: usize) -> Self {
        self.operating_rooms = n;
        self
    }

    pub fn blood_supply(mut self, supply: BTreeMap<BloodType, u32>) -> Self {
        self.blood_supply = supply;
        self
    }

    pub fn fatigue_model(mut self, model: FatigueModel) -> Self {
        self.fatigue_model = model;
        self
    }

    /// Ids are `B01…`, `S01…`, `N01…`, `OR-1…`
    pub fn build(self) -> ResourceManager {
        let beds = (1..=self.beds).map(|i| (format!("B{:02}", i), None)).collect();

        let surgeons = (1..=self.surgeons).map(|i| {
            let name = SURGEON_NAMES[(i - 1) % SURGEON_NAMES.len()];
            StaffMember::new(format!("S{:02}", i), format!("Dr. {}", name), StaffRole::Surgeon)
        });
        let nurses = (1..=self.nurses).map(|i| {
            let name = NURSE_NAMES[(i - 1) % NURSE_NAMES.len()];
            StaffMember::new(format!("N{:02}", i), format!("Nurse {}", name), StaffRole::Nurse)
        });
        let staff = surgeons.chain(nurses).collect();

        let rooms = (1..=self.operating_rooms)
            .map(|i| OperatingRoom::new(format!("OR-{}", i)))
            .collect();

        ResourceManager {
            beds,
            staff,
            rooms,
            blood: BloodBank::new(self.blood_supply),
            fatigue_model: self.fatigue_model,
        }
    }
}

impl ResourceManager {
    pub fn builder() -> ResourceManagerBuilder {
        ResourceManagerBuilder::default()
    }

    // ========================================================================
    // Beds
    // ========================================================================

    /// Free bed ids in ascending order
    pub fn available_beds(&self) -> Vec<&str> {
        self.beds
            .iter()
            .filter(|(_, occupant)| occupant.is_none())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn bed_count(&self) -> usize {
        self.beds.len()
    }

    /// Occupant of a bed (`None` for a free or unknown bed)
    pub fn bed_occupant(&self, bed_id: &str) -> Option<&str> {
        self.beds.get(bed_id).and_then(|o| o.as_deref())
    }

    /// Bed currently held by a patient
    pub fn bed_of(&self, patient_id: &str) -> Option<&str> {
        self.beds
            .iter()
            .find(|(_, occupant)| occupant.as_deref() == Some(patient_id))
            .map(|(id, _)| id.as_str())
    }

    /// Put a patient in a bed. False if the bed is unknown or occupied, or
    /// the patient already holds another bed.
    pub fn assign_bed(&mut self, bed_id: &str, patient_id: &str) -> bool {
        if self.bed_of(patient_id).is_some() {
            return false;
        }
        match self.beds.get_mut(bed_id) {
            Some(slot) if slot.is_none() => {
                *slot = Some(patient_id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Empty a bed, returning whoever was in it
    pub fn free_bed(&mut self, bed_id: &str) -> Option<String> {
        self.beds.get_mut(bed_id).and_then(Option::take)
    }

    // ========================================================================
    // Staff
    // ========================================================================

    pub fn staff(&self, staff_id: &str) -> Option<&StaffMember> {
        self.staff.iter().find(|s| s.id() == staff_id)
    }

    pub fn all_staff(&self) -> &[StaffMember] {
        &self.staff
    }

    fn staff_index(&self, staff_id: &str) -> Result<usize, ResourceError> {
        self.staff
            .iter()
            .position(|s| s.id() == staff_id)
            .ok_or_else(|| ResourceError::UnknownStaff(staff_id.to_string()))
    }

    fn available_by_role(&self, role: StaffRole) -> Vec<&StaffMember> {
        self.staff
            .iter()
            .filter(|s| s.role() == role && s.is_available())
            .collect()
    }

    /// On duty, not resting, not assigned
    pub fn available_surgeons(&self) -> Vec<&StaffMember> {
        self.available_by_role(StaffRole::Surgeon)
    }

    pub fn available_nurses(&self) -> Vec<&StaffMember> {
        self.available_by_role(StaffRole::Nurse)
    }

    /// Attach an available staff member to a patient
    pub fn assign_staff(&mut self, staff_id: &str, patient_id: &str) -> Result<(), ResourceError> {
        let idx = self.staff_index(staff_id)?;
        if !self.staff[idx].is_available() {
            return Err(ResourceError::StaffUnavailable(staff_id.to_string()));
        }
        self.staff[idx].assign(patient_id.to_string());
        Ok(())
    }

    /// Detach a staff member from their patient, returning the patient id
    pub fn release_staff(&mut self, staff_id: &str) -> Option<String> {
        self.staff
            .iter_mut()
            .find(|s| s.id() == staff_id)
            .and_then(StaffMember::release)
    }

    /// Detach every staff member attached to a patient, returning their ids
    pub fn release_patient_staff(&mut self, patient_id: &str) -> Vec<String> {
        self.staff
            .iter_mut()
            .filter(|s| s.current_patient() == Some(patient_id))
            .map(|s| {
                s.release();
                s.id().to_string()
            })
            .collect()
    }

    /// Start a rest period
    ///
    /// # Errors
    ///
    /// `UnknownStaff`, `AlreadyResting`, or `InvalidRestHours` for zero hours.
    pub fn send_to_rest(&mut self, staff_id: &str, hours: u32) -> Result<(), ResourceError> {
        let idx = self.staff_index(staff_id)?;
        if self.staff[idx].is_resting() {
            return Err(ResourceError::AlreadyResting(staff_id.to_string()));
        }
        if hours == 0 {
            return Err(ResourceError::InvalidRestHours);
        }
        self.staff[idx].start_rest(hours);
        Ok(())
    }

    pub fn fatigue_model(&self) -> &FatigueModel {
        &self.fatigue_model
    }

    // ========================================================================
    // Blood
    // ========================================================================

    /// See [`BloodBank::use_blood`]
    pub fn use_blood(
        &mut self,
        recipient: BloodType,
        units: u32,
    ) -> Result<Vec<BloodDraw>, ResourceError> {
        self.blood.use_blood(recipient, units)
    }

    pub fn blood_bank(&self) -> &BloodBank {
        &self.blood
    }

    pub fn compatible_stock(&self, recipient: BloodType) -> u32 {
        self.blood.compatible_stock(recipient)
    }

    pub fn blood_inventory(&self) -> &BTreeMap<BloodType, u32> {
        self.blood.inventory()
    }

    pub fn initial_blood_supply(&self) -> &BTreeMap<BloodType, u32> {
        self.blood.initial_supply()
    }

    // ========================================================================
    // Summary
    // ========================================================================

    pub fn summary(&self) -> ResourceSummary {
        let count_role = |role: StaffRole| self.staff.iter().filter(|s| s.role() == role).count();
        let average_fatigue = if self.staff.is_empty() {
            0.0
        } else {
            self.staff.iter().map(StaffMember::fatigue).sum::<f64>() / self.staff.len() as f64
        };

        ResourceSummary {
            beds_total: self.beds.len(),
            beds_free: self.available_beds().len(),
            surgeons_total: count_role(StaffRole::Surgeon),
            surgeons_available: self.available_surgeons().len(),
            nurses_total: count_role(StaffRole::Nurse),
            nurses_available: self.available_nurses().len(),
            staff_resting: self.staff.iter().filter(|s| s.is_resting()).count(),
            rooms_total: self.rooms.len(),
            rooms_free: self.available_rooms().len(),
            average_fatigue,
            blood_inventory: self.blood.inventory().clone(),
            blood_units_consumed: self.blood.units_consumed(),
        }
    }

    #[cfg(test)]
    pub(crate) fn staff_mut_for_test(&mut self, staff_id: &str) -> Option<&mut StaffMember> {
        self.staff.iter_mut().find(|s| s.id() == staff_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngManager;

    fn manager() -> ResourceManager {
        ResourceManager::builder()
            .beds(3)
            .surgeons(2)
            .nurses(2)
            .operating_rooms(2)
            .build()
    }

    #[test]
    fn test_builder_ids() {
        let rm = manager();
        assert_eq!(rm.available_beds(), vec!["B01", "B02", "B03"]);
        assert!(rm.staff("S01").is_some());
        assert!(rm.staff("N02").is_some());
        assert!(rm.staff("S03").is_none());
        assert_eq!(rm.operating_rooms()[1].id(), "OR-2");
    }

    #[test]
    fn test_assign_bed_unknown_or_occupied() {
        let mut rm = manager();
        assert!(!rm.assign_bed("B99", "P001"));
        assert!(rm.assign_bed("B02", "P001"));
        assert!(!rm.assign_bed("B02", "P002"));
        assert!(!rm.assign_bed("B03", "P001"), "patient already holds B02");
        assert_eq!(rm.bed_of("P001"), Some("B02"));
    }

    #[test]
    fn test_free_bed_returns_occupant_once() {
        let mut rm = manager();
        rm.assign_bed("B01", "P001");
        assert_eq!(rm.free_bed("B01"), Some("P001".to_string()));
        assert_eq!(rm.free_bed("B01"), None);
        assert_eq!(rm.free_bed("B77"), None);
    }

    #[test]
    fn test_available_staff_excludes_assigned_and_resting() {
        let mut rm = manager();
        rm.assign_staff("N01", "P001").unwrap();
        rm.send_to_rest("S02", 4).unwrap();

        let nurses: Vec<&str> = rm.available_nurses().iter().map(|s| s.id()).collect();
        let surgeons: Vec<&str> = rm.available_surgeons().iter().map(|s| s.id()).collect();
        assert_eq!(nurses, vec!["N02"]);
        assert_eq!(surgeons, vec!["S01"]);
    }

    #[test]
    fn test_send_to_rest_failures() {
        let mut rm = manager();
        assert_eq!(
            rm.send_to_rest("X01", 2),
            Err(ResourceError::UnknownStaff("X01".to_string()))
        );
        assert_eq!(rm.send_to_rest("S01", 0), Err(ResourceError::InvalidRestHours));
        rm.send_to_rest("S01", 2).unwrap();
        assert_eq!(
            rm.send_to_rest("S01", 2),
            Err(ResourceError::AlreadyResting("S01".to_string()))
        );
    }

    #[test]
    fn test_send_to_rest_clears_assignment() {
        let mut rm = manager();
        rm.assign_staff("N01", "P001").unwrap();
        rm.send_to_rest("N01", 1).unwrap();
        assert_eq!(rm.staff("N01").unwrap().current_patient(), None);
    }

    #[test]
    fn test_nine_hours_of_work_gives_fatigue_twenty() {
        let mut rm = manager();
        let mut rng = RngManager::new(1);
        for _ in 0..9 {
            rm.advance_fatigue(&mut rng);
        }
        let s01 = rm.staff("S01").unwrap();
        assert_eq!(s01.fatigue(), 20.0);
        assert_eq!(s01.hours_worked_continuous(), 9);
    }

    #[test]
    fn test_rest_recovers_eight_per_hour_and_resets_shift() {
        let mut rm = manager();
        let mut rng = RngManager::new(1);
        for _ in 0..10 {
            rm.advance_fatigue(&mut rng);
        }
        assert_eq!(rm.staff("S01").unwrap().fatigue(), 24.0);

        rm.send_to_rest("S01", 2).unwrap();
        let report = rm.advance_fatigue(&mut rng);
        assert!(report.rest_completed.is_empty());
        assert_eq!(rm.staff("S01").unwrap().fatigue(), 16.0);

        let report = rm.advance_fatigue(&mut rng);
        assert_eq!(report.rest_completed, vec![("S01".to_string(), 8.0)]);
        let s01 = rm.staff("S01").unwrap();
        assert_eq!(s01.hours_worked_continuous(), 0);
        assert!(!s01.is_resting());
    }

    #[test]
    fn test_idle_staff_never_err() {
        let mut rm = manager();
        rm.staff_mut_for_test("S01").unwrap().set_fatigue(100.0);
        let mut rng = RngManager::new(3);
        for _ in 0..50 {
            assert!(rm.advance_fatigue(&mut rng).incidents.is_empty());
        }
    }

    #[test]
    fn test_exhausted_assigned_staff_eventually_err() {
        let mut rm = manager();
        rm.staff_mut_for_test("N01").unwrap().set_fatigue(100.0);
        rm.assign_staff("N01", "P009").unwrap();
        let mut rng = RngManager::new(3);

        let errors: usize = (0..200)
            .map(|_| rm.advance_fatigue(&mut rng).incidents.len())
            .sum();
        assert!(errors > 0);
        assert_eq!(rm.staff("N01").unwrap().error_count() as usize, errors);
    }

    #[test]
    fn test_release_patient_staff() {
        let mut rm = manager();
        rm.assign_staff("N01", "P001").unwrap();
        rm.assign_staff("S02", "P001").unwrap();
        rm.assign_staff("N02", "P002").unwrap();

        assert_eq!(rm.release_patient_staff("P001"), vec!["S02", "N01"]);
        assert!(rm.staff("N01").unwrap().is_available());
        assert_eq!(rm.staff("N02").unwrap().current_patient(), Some("P002"));
    }

    #[test]
    fn test_summary_counts() {
        let mut rm = manager();
        rm.assign_bed("B01", "P001");
        rm.send_to_rest("N02", 3).unwrap();
        let s = rm.summary();
        assert_eq!(s.beds_total, 3);
        assert_eq!(s.beds_free, 2);
        assert_eq!(s.nurses_available, 1);
        assert_eq!(s.staff_resting, 1);
        assert_eq!(s.rooms_free, 2);
    }
}
