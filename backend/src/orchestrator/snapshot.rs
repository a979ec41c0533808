//! Read-only state snapshots
//!
//! [`StateSnapshot`] is what `get_state()` hands to the outside world: the
//! clock, roster counts, the waiting queue, every patient and staff member,
//! resource totals and metrics. It is a copy; mutating it has no effect on
//! the engine.
//!
//! # Digests
//!
//! [`StateSnapshot::digest`] hashes the canonical JSON form with SHA-256 and
//! leaves out `run_id`, so two engines that reached the same state through
//! the same seed and operations produce the same digest.

use crate::core::digest::canonical_digest;
use crate::models::blood::BloodType;
use crate::models::patient::{Patient, PatientStatus, SocialStatus};
use crate::models::staff::StaffMember;
use crate::resources::{OperatingRoom, ResourceSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Performance indicators, recomputed at the end of every tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub hour: usize,
    pub admitted: usize,
    pub discharged: usize,
    pub deaths: usize,
    pub readmissions: u32,
    pub premature_discharges: u32,
    pub triage_skips: usize,
    pub fatigue_errors: usize,
    /// Discharges per elapsed hour
    pub throughput: f64,
    /// Discharges per admitted patient
    pub efficiency: f64,
    /// Occupied beds over total beds
    pub bed_utilization: f64,
}

/// Patients per lifecycle state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientCounts {
    pub total: usize,
    pub not_arrived: usize,
    pub waiting: usize,
    pub assigned_bed: usize,
    pub in_surgery: usize,
    pub recovering: usize,
    pub discharged: usize,
    pub deceased: usize,
}

impl PatientCounts {
    pub fn tally(patients: &[Patient]) -> Self {
        let mut counts = PatientCounts {
            total: patients.len(),
            ..Default::default()
        };
        for p in patients {
            if !p.is_admitted() {
                counts.not_arrived += 1;
                continue;
            }
            match p.status() {
                PatientStatus::Waiting => counts.waiting += 1,
                PatientStatus::AssignedBed => counts.assigned_bed += 1,
                PatientStatus::InSurgery => counts.in_surgery += 1,
                PatientStatus::Recovering => counts.recovering += 1,
                PatientStatus::Discharged => counts.discharged += 1,
                PatientStatus::Deceased => counts.deceased += 1,
            }
        }
        counts
    }
}

/// Flattened view of one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub social_status: SocialStatus,
    pub triage: u8,
    pub original_triage: u8,
    pub condition: String,
    pub blood_type: BloodType,
    pub status: PatientStatus,
    pub arrival_hour: usize,
    pub hours_waiting: u32,
    pub bed_id: Option<String>,
    pub nurse_id: Option<String>,
    pub needs_surgery: bool,
    pub needs_blood: bool,
    pub blood_units_received: u32,
    pub has_dnr: bool,
    pub family_present: bool,
    pub family_anxiety: u8,
    pub readmissions: u32,
}

impl From<&Patient> for PatientSummary {
    fn from(p: &Patient) -> Self {
        PatientSummary {
            id: p.id().to_string(),
            name: p.name().to_string(),
            age: p.demographics().age,
            social_status: p.social_status(),
            triage: p.triage_score(),
            original_triage: p.original_triage(),
            condition: p.condition().to_string(),
            blood_type: p.blood_type(),
            status: p.status(),
            arrival_hour: p.arrival_hour(),
            hours_waiting: p.hours_waiting(),
            bed_id: p.bed_id().map(str::to_string),
            nurse_id: p.nurse_id().map(str::to_string),
            needs_surgery: p.needs_surgery(),
            needs_blood: p.needs_blood(),
            blood_units_received: p.blood_units_received(),
            has_dnr: p.has_dnr(),
            family_present: p.family_present(),
            family_anxiety: p.family_anxiety(),
            readmissions: p.readmissions(),
        }
    }
}

/// Complete read-only engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Per-instance identifier, excluded from [`StateSnapshot::digest`]
    pub run_id: Uuid,
    pub config_hash: String,
    pub current_hour: usize,
    pub duration_hours: usize,
    pub complete: bool,
    pub rng_state: u64,
    pub counts: PatientCounts,
    /// Admitted Waiting patients, most critical first, then by arrival
    pub waiting_queue: Vec<String>,
    pub patients: Vec<PatientSummary>,
    pub staff: Vec<StaffMember>,
    pub operating_rooms: Vec<OperatingRoom>,
    pub resources: ResourceSummary,
    pub metrics: Metrics,
    pub pending_inquiry: Option<String>,
    pub event_count: usize,
}

impl StateSnapshot {
    /// SHA-256 over the canonical JSON form, ignoring `run_id`
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("run_id");
        }
        canonical_digest(&value)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
