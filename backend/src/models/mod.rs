//! Domain models for the emergency department simulator

pub mod blood;
pub mod event;
pub mod patient;
pub mod staff;

// Re-exports
pub use blood::{BloodDraw, BloodType};
pub use event::{Event, EventLog, EventObserver};
pub use patient::{
    ClinicalProfile, Demographics, FamilyContext, Insurance, Patient, PatientStatus, SocialStatus,
};
pub use staff::{StaffMember, StaffRole};
