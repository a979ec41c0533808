//! Patient model
//!
//! A patient moves through the lifecycle
//!
//! ```text
//! Waiting → AssignedBed → InSurgery → Recovering → Discharged
//!              │                          ▲
//!              └── (bed-only treatment) ──┘
//! Waiting → Deceased
//! Discharged (premature) → Waiting   (readmission, triage one level worse)
//! ```
//!
//! Lifecycle mutators are `pub(crate)`: only the engine drives transitions.
//!
//! # Critical Invariants
//!
//! 1. `1 <= triage_score <= 5` at all times
//! 2. `original_triage` never changes after construction
//! 3. `hours_waiting` never decreases while the patient is Waiting
//! 4. `family_anxiety <= 100`

use crate::models::blood::BloodType;
use serde::{Deserialize, Serialize};

/// Most critical triage level
pub const TRIAGE_MIN: u8 = 1;
/// Least critical triage level
pub const TRIAGE_MAX: u8 = 5;

/// Upper bound for family anxiety
pub const MAX_ANXIETY: u8 = 100;

/// Lifecycle state of a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatientStatus {
    Waiting,
    AssignedBed,
    InSurgery,
    Recovering,
    Discharged,
    Deceased,
}

impl PatientStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PatientStatus::Discharged | PatientStatus::Deceased)
    }

    /// True while the patient occupies a bed
    pub fn holds_bed(self) -> bool {
        matches!(
            self,
            PatientStatus::AssignedBed | PatientStatus::InSurgery | PatientStatus::Recovering
        )
    }
}

/// Social marker used by the scripted dilemmas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialStatus {
    Standard,
    /// Public figure, donor, official
    Vip,
    /// Unhoused, undocumented, or otherwise marginalised
    Disadvantaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Insurance {
    Private,
    Public,
    Uninsured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub name: String,
    pub age: u8,
    pub sex: char,
    pub occupation: String,
    pub social_status: SocialStatus,
    pub insurance: Insurance,
}

/// Clinical picture at arrival
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalProfile {
    pub triage: u8,
    pub condition: String,
    pub blood_type: BloodType,
    pub needs_surgery: bool,
    pub needs_blood: bool,
    pub blood_units_needed: u32,
    pub has_dnr: bool,
    /// Hours between triage decrements while waiting
    pub deterioration_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyContext {
    pub present: bool,
    pub anxiety: u8,
}

impl FamilyContext {
    pub fn absent() -> Self {
        Self {
            present: false,
            anxiety: 0,
        }
    }
}

/// A patient in the emergency department
///
/// # Example
/// ```
/// use triage_simulator_core_rs::models::patient::*;
/// use triage_simulator_core_rs::BloodType;
///
/// let patient = Patient::new(
///     "P001".to_string(),
///     0,
///     Demographics {
///         name: "Ana Ruiz".to_string(),
///         age: 34,
///         sex: 'F',
///         occupation: "Teacher".to_string(),
///         social_status: SocialStatus::Standard,
///         insurance: Insurance::Public,
///     },
///     ClinicalProfile {
///         triage: 2,
///         condition: "Open femur fracture".to_string(),
///         blood_type: BloodType::APos,
///         needs_surgery: true,
///         needs_blood: false,
///         blood_units_needed: 0,
///         has_dnr: false,
///         deterioration_rate: 3,
///     },
///     FamilyContext::absent(),
/// );
///
/// assert_eq!(patient.triage_score(), 2);
/// assert_eq!(patient.status(), PatientStatus::Waiting);
/// assert!(!patient.is_admitted());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    id: String,
    demographics: Demographics,
    triage_score: u8,
    original_triage: u8,
    condition: String,
    blood_type: BloodType,
    needs_surgery: bool,
    needs_blood: bool,
    blood_units_needed: u32,
    blood_units_received: u32,
    has_dnr: bool,
    deterioration_rate: u32,
    arrival_hour: usize,
    admitted_hour: Option<usize>,
    hours_waiting: u32,
    family_present: bool,
    family_anxiety: u8,
    hours_since_family_update: u32,
    status: PatientStatus,
    bed_id: Option<String>,
    nurse_id: Option<String>,
    hours_in_bed: u32,
    recovery_hours: u32,
    discharged_hour: Option<usize>,
    death_hour: Option<usize>,
    premature_discharges: u32,
    readmissions: u32,
}

impl Patient {
    /// Create a patient who has not yet arrived
    ///
    /// Triage is clamped into `[1, 5]` and a zero deterioration rate is
    /// raised to 1 so the waiting clock always has a period.
    pub fn new(
        id: String,
        arrival_hour: usize,
        demographics: Demographics,
        clinical: ClinicalProfile,
        family: FamilyContext,
    ) -> Self {
        let triage = clinical.triage.clamp(TRIAGE_MIN, TRIAGE_MAX);
        Self {
            id,
            demographics,
            triage_score: triage,
            original_triage: triage,
            condition: clinical.condition,
            blood_type: clinical.blood_type,
            needs_surgery: clinical.needs_surgery,
            needs_blood: clinical.needs_blood,
            blood_units_needed: clinical.blood_units_needed,
            blood_units_received: 0,
            has_dnr: clinical.has_dnr,
            deterioration_rate: clinical.deterioration_rate.max(1),
            arrival_hour,
            admitted_hour: None,
            hours_waiting: 0,
            family_present: family.present,
            family_anxiety: family.anxiety.min(MAX_ANXIETY),
            hours_since_family_update: 0,
            status: PatientStatus::Waiting,
            bed_id: None,
            nurse_id: None,
            hours_in_bed: 0,
            recovery_hours: 0,
            discharged_hour: None,
            death_hour: None,
            premature_discharges: 0,
            readmissions: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    pub fn name(&self) -> &str {
        &self.demographics.name
    }

    pub fn social_status(&self) -> SocialStatus {
        self.demographics.social_status
    }

    pub fn is_vip(&self) -> bool {
        self.demographics.social_status == SocialStatus::Vip
    }

    pub fn triage_score(&self) -> u8 {
        self.triage_score
    }

    pub fn original_triage(&self) -> u8 {
        self.original_triage
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn blood_type(&self) -> BloodType {
        self.blood_type
    }

    pub fn needs_surgery(&self) -> bool {
        self.needs_surgery
    }

    pub fn needs_blood(&self) -> bool {
        self.needs_blood
    }

    pub fn blood_units_needed(&self) -> u32 {
        self.blood_units_needed
    }

    pub fn blood_units_received(&self) -> u32 {
        self.blood_units_received
    }

    pub fn has_dnr(&self) -> bool {
        self.has_dnr
    }

    pub fn deterioration_rate(&self) -> u32 {
        self.deterioration_rate
    }

    pub fn arrival_hour(&self) -> usize {
        self.arrival_hour
    }

    pub fn admitted_hour(&self) -> Option<usize> {
        self.admitted_hour
    }

    /// True once the patient has arrived at the department
    pub fn is_admitted(&self) -> bool {
        self.admitted_hour.is_some()
    }

    /// Admitted and waiting for a bed
    pub fn is_waiting(&self) -> bool {
        self.is_admitted() && self.status == PatientStatus::Waiting
    }

    pub fn hours_waiting(&self) -> u32 {
        self.hours_waiting
    }

    pub fn family_present(&self) -> bool {
        self.family_present
    }

    pub fn family_anxiety(&self) -> u8 {
        self.family_anxiety
    }

    pub fn hours_since_family_update(&self) -> u32 {
        self.hours_since_family_update
    }

    pub fn status(&self) -> PatientStatus {
        self.status
    }

    pub fn bed_id(&self) -> Option<&str> {
        self.bed_id.as_deref()
    }

    pub fn nurse_id(&self) -> Option<&str> {
        self.nurse_id.as_deref()
    }

    pub fn hours_in_bed(&self) -> u32 {
        self.hours_in_bed
    }

    pub fn recovery_hours(&self) -> u32 {
        self.recovery_hours
    }

    pub fn discharged_hour(&self) -> Option<usize> {
        self.discharged_hour
    }

    pub fn death_hour(&self) -> Option<usize> {
        self.death_hour
    }

    pub fn premature_discharges(&self) -> u32 {
        self.premature_discharges
    }

    pub fn readmissions(&self) -> u32 {
        self.readmissions
    }

    // ========================================================================
    // Generation overrides
    // ========================================================================

    /// Replace the clinical and demographic profile, keeping id and arrival
    pub(crate) fn overridden(
        &self,
        demographics: Demographics,
        clinical: ClinicalProfile,
        family: FamilyContext,
    ) -> Patient {
        Patient::new(
            self.id.clone(),
            self.arrival_hour,
            demographics,
            clinical,
            family,
        )
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    // ========================================================================
    // Lifecycle (engine only)
    // ========================================================================

    pub(crate) fn admit(&mut self, hour: usize) {
        self.admitted_hour = Some(hour);
        self.status = PatientStatus::Waiting;
    }

    /// One hour of waiting. Returns `(old, new)` triage when the patient
    /// deteriorated this hour.
    pub(crate) fn wait_one_hour(&mut self) -> Option<(u8, u8)> {
        self.hours_waiting += 1;
        if self.hours_waiting % self.deterioration_rate != 0 {
            return None;
        }
        let old = self.triage_score;
        let new = old.saturating_sub(1).max(TRIAGE_MIN);
        if new == old {
            return None;
        }
        self.triage_score = new;
        Some((old, new))
    }

    pub(crate) fn assign_bed(&mut self, bed_id: String, nurse_id: Option<String>) {
        self.status = PatientStatus::AssignedBed;
        self.bed_id = Some(bed_id);
        self.nurse_id = nurse_id;
        self.hours_in_bed = 0;
        self.recovery_hours = 0;
    }

    /// One hour in a bed; recovery hours only count while Recovering
    pub(crate) fn bed_one_hour(&mut self) {
        self.hours_in_bed += 1;
        if self.status == PatientStatus::Recovering {
            self.recovery_hours += 1;
        }
    }

    pub(crate) fn start_surgery(&mut self) {
        self.status = PatientStatus::InSurgery;
    }

    /// Surgery or bed-only treatment finished
    pub(crate) fn begin_recovery(&mut self) {
        self.status = PatientStatus::Recovering;
        self.needs_surgery = false;
        self.recovery_hours = 0;
    }

    /// Release bed and nurse, returning them for the resource manager
    pub(crate) fn release_bed(&mut self) -> (Option<String>, Option<String>) {
        (self.bed_id.take(), self.nurse_id.take())
    }

    pub(crate) fn clear_nurse(&mut self) -> Option<String> {
        self.nurse_id.take()
    }

    pub(crate) fn discharge(&mut self, hour: usize) {
        self.status = PatientStatus::Discharged;
        self.discharged_hour = Some(hour);
    }

    pub(crate) fn record_premature_discharge(&mut self) {
        self.premature_discharges += 1;
    }

    /// Back to the waiting room one triage level worse (floor 1)
    pub(crate) fn readmit(&mut self) {
        self.triage_score = self.triage_score.saturating_sub(1).max(TRIAGE_MIN);
        self.status = PatientStatus::Waiting;
        self.hours_waiting = 0;
        self.hours_in_bed = 0;
        self.recovery_hours = 0;
        self.discharged_hour = None;
        self.readmissions += 1;
    }

    pub(crate) fn die(&mut self, hour: usize) {
        self.status = PatientStatus::Deceased;
        self.death_hour = Some(hour);
    }

    /// Caller validates the range
    pub(crate) fn set_triage(&mut self, triage: u8) {
        self.triage_score = triage.clamp(TRIAGE_MIN, TRIAGE_MAX);
    }

    pub(crate) fn receive_blood(&mut self, units: u32) {
        self.blood_units_received += units;
        if self.blood_units_received >= self.blood_units_needed {
            self.needs_blood = false;
        }
    }

    /// One hour without news for the family. Anxiety grows by `growth` once
    /// the silence exceeds `threshold_hours`. Returns `(old, new)` anxiety
    /// when it changed.
    pub(crate) fn family_one_hour(&mut self, threshold_hours: u32, growth: u8) -> Option<(u8, u8)> {
        if !self.family_present {
            return None;
        }
        self.hours_since_family_update += 1;
        if self.hours_since_family_update <= threshold_hours {
            return None;
        }
        let old = self.family_anxiety;
        let new = old.saturating_add(growth).min(MAX_ANXIETY);
        self.family_anxiety = new;
        (new != old).then_some((old, new))
    }

    /// Returns `(old, new)` anxiety
    pub(crate) fn update_family(&mut self, relief: u8) -> (u8, u8) {
        let old = self.family_anxiety;
        self.family_anxiety = old.saturating_sub(relief);
        self.hours_since_family_update = 0;
        (old, self.family_anxiety)
    }
}
