//! Operation set and outcomes
//!
//! [`Operation`] is the closed set of things a caller can ask the engine to
//! do. It is tagged with `action` so a presentation layer can parse requests
//! straight into it; an unknown action fails at parse time.
//!
//! ```rust
//! use triage_simulator_core_rs::orchestrator::Operation;
//!
//! let op: Operation =
//!     serde_json::from_str(r#"{"action": "assign_bed", "patient_id": "P004"}"#).unwrap();
//! assert_eq!(op, Operation::AssignBed { patient_id: "P004".to_string() });
//!
//! assert!(serde_json::from_str::<Operation>(r#"{"action": "bribe"}"#).is_err());
//! ```

use crate::models::blood::BloodType;
use crate::models::event::Event;
use crate::models::patient::PatientStatus;
use crate::orchestrator::snapshot::Metrics;
use crate::policy::PolicyRule;
use crate::resources::ResourceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A caller request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Operation {
    AdvanceHour,
    AssignBed {
        patient_id: String,
    },
    /// Surgeon and room are picked automatically when omitted
    ScheduleSurgery {
        patient_id: String,
        #[serde(default)]
        surgeon_id: Option<String>,
        #[serde(default)]
        room_id: Option<String>,
    },
    DischargePatient {
        patient_id: String,
    },
    AdministerBlood {
        patient_id: String,
        units: u32,
    },
    SetTriage {
        patient_id: String,
        triage: u8,
    },
    SetStaffRest {
        staff_id: String,
        hours: u32,
    },
    UpdateFamily {
        patient_id: String,
    },
    RespondToMedia {
        reported_deaths: u32,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AdvanceHour => "advance_hour",
            Operation::AssignBed { .. } => "assign_bed",
            Operation::ScheduleSurgery { .. } => "schedule_surgery",
            Operation::DischargePatient { .. } => "discharge_patient",
            Operation::AdministerBlood { .. } => "administer_blood",
            Operation::SetTriage { .. } => "set_triage",
            Operation::SetStaffRest { .. } => "set_staff_rest",
            Operation::UpdateFamily { .. } => "update_family",
            Operation::RespondToMedia { .. } => "respond_to_media",
        }
    }
}

/// Result of a non-tick operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    /// Hour the operation was applied in
    pub hour: usize,
    /// Events emitted, in order
    pub events: Vec<Event>,
}

impl OperationReport {
    pub fn has_event(&self, event_type: &str) -> bool {
        self.events.iter().any(|e| e.event_type() == event_type)
    }
}

/// Result of one hourly tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub hour: usize,
    pub events: Vec<Event>,
    pub arrivals: usize,
    pub deaths: usize,
    pub metrics: Metrics,
    /// True once the final hour has been simulated
    pub complete: bool,
}

/// Outcome of [`Engine::apply`](crate::orchestrator::Engine::apply)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    Tick(TickReport),
    Operation(OperationReport),
}

impl Outcome {
    pub fn events(&self) -> &[Event] {
        match self {
            Outcome::Tick(report) => &report.events,
            Outcome::Operation(report) => &report.events,
        }
    }
}

/// Bad input or a request that makes no sense in the current state
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown patient: {0}")]
    UnknownPatient(String),

    #[error("Unknown staff member: {0}")]
    UnknownStaff(String),

    #[error("Unknown operating room: {0}")]
    UnknownRoom(String),

    #[error("Patient {0} has not arrived yet")]
    NotYetArrived(String),

    #[error("Cannot {operation} patient {patient_id} while {status:?}")]
    InvalidState {
        patient_id: String,
        status: PatientStatus,
        operation: &'static str,
    },

    #[error("Triage must be between 1 and 5, got {0}")]
    TriageOutOfRange(u8),

    #[error("Rest must be between 1 and {max} hours, got {hours}")]
    InvalidRestHours { hours: u32, max: u32 },

    #[error("Blood request must be between 1 and {max} units, got {units}")]
    InvalidBloodUnits { units: u32, max: u32 },

    #[error("Patient {0} does not need surgery")]
    NoSurgeryNeeded(String),

    #[error("Patient {0} has no family present")]
    NoFamilyPresent(String),

    #[error("Staff member {0} is not a surgeon")]
    NotASurgeon(String),

    #[error("Staff member {0} is already resting")]
    AlreadyResting(String),

    #[error("No media inquiry is pending")]
    NoPendingInquiry,

    #[error("Simulation is complete")]
    SimulationComplete,

    #[error("{0}")]
    Resource(ResourceError),
}

/// A resource the request needs is not available
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeclineReason {
    #[error("No bed available")]
    NoBedAvailable,

    #[error("No surgeon available")]
    NoSurgeonAvailable,

    #[error("No operating room available")]
    NoRoomAvailable,

    #[error("Surgeon {0} is not available")]
    SurgeonUnavailable(String),

    #[error("Operating room {0} is in use")]
    RoomBusy(String),

    #[error("Surgeon {0} is operating")]
    SurgeonInSurgery(String),

    #[error("Insufficient blood for {recipient}: requested {requested}, compatible stock {available}")]
    InsufficientBlood {
        recipient: BloodType,
        requested: u32,
        available: u32,
    },
}

/// Why an operation did not happen. State is unchanged in every case.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperationError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Declined: {0}")]
    Declined(#[from] DeclineReason),

    #[error("Blocked by {rule} policy: {detail}")]
    Blocked { rule: PolicyRule, detail: String },
}

impl OperationError {
    pub fn is_blocked(&self) -> bool {
        matches!(self, OperationError::Blocked { .. })
    }

    pub fn is_declined(&self) -> bool {
        matches!(self, OperationError::Declined(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_json_shapes() {
        let op: Operation = serde_json::from_str(
            r#"{"action": "schedule_surgery", "patient_id": "P001", "room_id": "OR-2"}"#,
        )
        .unwrap();
        assert_eq!(
            op,
            Operation::ScheduleSurgery {
                patient_id: "P001".to_string(),
                surgeon_id: None,
                room_id: Some("OR-2".to_string()),
            }
        );

        let tick: Operation = serde_json::from_str(r#"{"action": "advance_hour"}"#).unwrap();
        assert_eq!(tick.name(), "advance_hour");
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = r#"{"action": "set_triage", "patient_id": "P001"}"#;
        assert!(serde_json::from_str::<Operation>(json).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = OperationError::Blocked {
            rule: PolicyRule::TriageOrder,
            detail: "P005 ahead of P002".to_string(),
        };
        assert_eq!(err.to_string(), "Blocked by triage order policy: P005 ahead of P002");

        let err: OperationError = DeclineReason::NoBedAvailable.into();
        assert!(err.is_declined());
    }
}
