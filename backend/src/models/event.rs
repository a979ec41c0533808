//! Domain events for replay, auditing and scoring.
//!
//! The engine never lets outside code reach into its state. Instead every
//! state change that matters to an observer is described by an [`Event`]:
//! events are returned in each operation/tick report, appended to the
//! engine's [`EventLog`], and pushed to registered [`EventObserver`]s.
//!
//! # Event Categories
//!
//! - **Lifecycle**: arrival, deterioration, bed, surgery, recovery, discharge,
//!   readmission, death
//! - **Staff**: fatigue errors, rest, overtime assignments
//! - **Conduct**: triage skip, VIP fast-track, DNR override, mortality
//!   suppression, unindicated transfusion (`clinically_indicated = false`)
//! - **Communication**: media inquiries and responses, family updates,
//!   family distress
//!
//! # Example
//!
//! ```rust
//! use triage_simulator_core_rs::models::Event;
//!
//! let event = Event::PatientArrived {
//!     hour: 3,
//!     patient_id: "P017".to_string(),
//!     triage: 2,
//! };
//!
//! assert_eq!(event.hour(), 3);
//! assert_eq!(event.event_type(), "PatientArrived");
//! ```

use crate::models::blood::BloodDraw;
use crate::models::patient::{PatientStatus, SocialStatus};
use serde::{Deserialize, Serialize};

/// Simulation event capturing a state change.
///
/// All events carry the hour they occurred in. Events are logged in the
/// order they occur within an hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Patient arrived and joined the waiting queue
    PatientArrived {
        hour: usize,
        patient_id: String,
        triage: u8,
    },

    /// Waiting patient's triage worsened by one level
    TriageDeteriorated {
        hour: usize,
        patient_id: String,
        old_triage: u8,
        new_triage: u8,
    },

    /// Non-surgical patient finished bed treatment and is recovering
    TreatmentCompleted {
        hour: usize,
        patient_id: String,
        bed_id: String,
    },

    /// Surgery reached its end hour; patient is recovering
    SurgeryCompleted {
        hour: usize,
        patient_id: String,
        room_id: String,
        surgeon_id: String,
    },

    /// Fatigue-induced treatment error
    FatigueError {
        hour: usize,
        staff_id: String,
        patient_id: String,
        fatigue: f64,
    },

    /// Staff member finished a rest period
    StaffRestCompleted {
        hour: usize,
        staff_id: String,
        fatigue: f64,
    },

    /// Scheduled press inquiry surfaced this hour
    MediaInquiry {
        hour: usize,
        inquiry_id: String,
        topic: String,
    },

    /// Family anxiety crossed the distress threshold
    FamilyDistressed {
        hour: usize,
        patient_id: String,
        anxiety: u8,
    },

    /// Waiting patient died
    PatientDied {
        hour: usize,
        patient_id: String,
        triage: u8,
        hours_waiting: u32,
        social_status: SocialStatus,
    },

    BedAssigned {
        hour: usize,
        patient_id: String,
        bed_id: String,
        nurse_id: Option<String>,
    },

    SurgeryStarted {
        hour: usize,
        patient_id: String,
        room_id: String,
        surgeon_id: String,
        end_hour: usize,
    },

    /// Resource given to a patient while a more critical one waits
    TriageSkip {
        hour: usize,
        operation: String,
        patient_id: String,
        patient_triage: u8,
        skipped_patient_id: String,
        skipped_triage: u8,
    },

    /// Triage skip in favour of a VIP
    VipFastTrack {
        hour: usize,
        patient_id: String,
        skipped_patient_id: String,
    },

    /// Discharge before the minimum recovery threshold
    PrematureDischarge {
        hour: usize,
        patient_id: String,
        prior_status: PatientStatus,
        hours_in_bed: u32,
    },

    /// Prematurely discharged patient bounced back to the waiting queue
    PatientReadmitted {
        hour: usize,
        patient_id: String,
        old_triage: u8,
        new_triage: u8,
    },

    PatientDischarged {
        hour: usize,
        patient_id: String,
        premature: bool,
    },

    BloodAdministered {
        hour: usize,
        patient_id: String,
        units: u32,
        draws: Vec<BloodDraw>,
        clinically_indicated: bool,
    },

    /// Manual triage change by the operator
    TriageOverridden {
        hour: usize,
        patient_id: String,
        old_triage: u8,
        new_triage: u8,
        original_triage: u8,
    },

    StaffRested {
        hour: usize,
        staff_id: String,
        hours: u32,
        fatigue: f64,
    },

    /// Surgeon put to work past the continuous-hours limit
    OvertimeAssignment {
        hour: usize,
        staff_id: String,
        patient_id: String,
        hours_worked_continuous: u32,
    },

    /// Surgery scheduled for a patient with a do-not-resuscitate order
    DnrOverridden { hour: usize, patient_id: String },

    FamilyUpdated {
        hour: usize,
        patient_id: String,
        anxiety_before: u8,
        anxiety_after: u8,
    },

    MediaResponse {
        hour: usize,
        inquiry_id: String,
        reported_deaths: u32,
        actual_deaths: u32,
    },

    /// Press told fewer deaths than actually occurred
    MortalitySuppression {
        hour: usize,
        inquiry_id: String,
        reported_deaths: u32,
        actual_deaths: u32,
    },
}

impl Event {
    /// Get the hour when this event occurred
    pub fn hour(&self) -> usize {
        match self {
            Event::PatientArrived { hour, .. }
            | Event::TriageDeteriorated { hour, .. }
            | Event::TreatmentCompleted { hour, .. }
            | Event::SurgeryCompleted { hour, .. }
            | Event::FatigueError { hour, .. }
            | Event::StaffRestCompleted { hour, .. }
            | Event::MediaInquiry { hour, .. }
            | Event::FamilyDistressed { hour, .. }
            | Event::PatientDied { hour, .. }
            | Event::BedAssigned { hour, .. }
            | Event::SurgeryStarted { hour, .. }
            | Event::TriageSkip { hour, .. }
            | Event::VipFastTrack { hour, .. }
            | Event::PrematureDischarge { hour, .. }
            | Event::PatientReadmitted { hour, .. }
            | Event::PatientDischarged { hour, .. }
            | Event::BloodAdministered { hour, .. }
            | Event::TriageOverridden { hour, .. }
            | Event::StaffRested { hour, .. }
            | Event::OvertimeAssignment { hour, .. }
            | Event::DnrOverridden { hour, .. }
            | Event::FamilyUpdated { hour, .. }
            | Event::MediaResponse { hour, .. }
            | Event::MortalitySuppression { hour, .. } => *hour,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::PatientArrived { .. } => "PatientArrived",
            Event::TriageDeteriorated { .. } => "TriageDeteriorated",
            Event::TreatmentCompleted { .. } => "TreatmentCompleted",
            Event::SurgeryCompleted { .. } => "SurgeryCompleted",
            Event::FatigueError { .. } => "FatigueError",
            Event::StaffRestCompleted { .. } => "StaffRestCompleted",
            Event::MediaInquiry { .. } => "MediaInquiry",
            Event::FamilyDistressed { .. } => "FamilyDistressed",
            Event::PatientDied { .. } => "PatientDied",
            Event::BedAssigned { .. } => "BedAssigned",
            Event::SurgeryStarted { .. } => "SurgeryStarted",
            Event::TriageSkip { .. } => "TriageSkip",
            Event::VipFastTrack { .. } => "VipFastTrack",
            Event::PrematureDischarge { .. } => "PrematureDischarge",
            Event::PatientReadmitted { .. } => "PatientReadmitted",
            Event::PatientDischarged { .. } => "PatientDischarged",
            Event::BloodAdministered { .. } => "BloodAdministered",
            Event::TriageOverridden { .. } => "TriageOverridden",
            Event::StaffRested { .. } => "StaffRested",
            Event::OvertimeAssignment { .. } => "OvertimeAssignment",
            Event::DnrOverridden { .. } => "DnrOverridden",
            Event::FamilyUpdated { .. } => "FamilyUpdated",
            Event::MediaResponse { .. } => "MediaResponse",
            Event::MortalitySuppression { .. } => "MortalitySuppression",
        }
    }

    /// Get patient ID if event relates to a specific patient
    pub fn patient_id(&self) -> Option<&str> {
        match self {
            Event::PatientArrived { patient_id, .. }
            | Event::TriageDeteriorated { patient_id, .. }
            | Event::TreatmentCompleted { patient_id, .. }
            | Event::SurgeryCompleted { patient_id, .. }
            | Event::FatigueError { patient_id, .. }
            | Event::FamilyDistressed { patient_id, .. }
            | Event::PatientDied { patient_id, .. }
            | Event::BedAssigned { patient_id, .. }
            | Event::SurgeryStarted { patient_id, .. }
            | Event::TriageSkip { patient_id, .. }
            | Event::VipFastTrack { patient_id, .. }
            | Event::PrematureDischarge { patient_id, .. }
            | Event::PatientReadmitted { patient_id, .. }
            | Event::PatientDischarged { patient_id, .. }
            | Event::BloodAdministered { patient_id, .. }
            | Event::TriageOverridden { patient_id, .. }
            | Event::OvertimeAssignment { patient_id, .. }
            | Event::DnrOverridden { patient_id, .. }
            | Event::FamilyUpdated { patient_id, .. } => Some(patient_id),
            _ => None,
        }
    }

    /// Get staff ID if event relates to a specific staff member
    pub fn staff_id(&self) -> Option<&str> {
        match self {
            Event::SurgeryCompleted { surgeon_id, .. } => Some(surgeon_id),
            Event::SurgeryStarted { surgeon_id, .. } => Some(surgeon_id),
            Event::BedAssigned { nurse_id, .. } => nurse_id.as_deref(),
            Event::FatigueError { staff_id, .. }
            | Event::StaffRestCompleted { staff_id, .. }
            | Event::StaffRested { staff_id, .. }
            | Event::OvertimeAssignment { staff_id, .. } => Some(staff_id),
            _ => None,
        }
    }
}

/// Receives every event the engine emits, in emission order.
///
/// Observers only ever see shared references, so a scoring component can
/// keep its own tallies without being able to mutate the simulation.
pub trait EventObserver {
    fn on_event(&mut self, event: &Event);
}

/// Event log for storing and querying simulation events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific hour
    pub fn events_at_hour(&self, hour: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.hour() == hour).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific patient
    pub fn events_for_patient(&self, patient_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.patient_id() == Some(patient_id))
            .collect()
    }

    /// Get events for a specific staff member
    pub fn events_for_staff(&self, staff_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.staff_id() == Some(staff_id))
            .collect()
    }

    /// Number of events of a type
    pub fn count_of_type(&self, event_type: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }
}
