//! Triage Simulator Core - Rust Engine
//!
//! Deterministic, seed-reproducible simulation of a mass-casualty emergency
//! department under scarce, contended resources.
//!
//! # Architecture
//!
//! - **core**: Simulation clock and canonical digests
//! - **rng**: Deterministic random number generation
//! - **models**: Domain types (Patient, StaffMember, BloodType, Event)
//! - **arrivals**: Patient population generator with scripted dilemmas
//! - **resources**: Beds, staff fatigue, operating rooms, blood bank
//! - **policy**: Allocation policy variants (standard / strict)
//! - **events**: Scheduled scenario events (media inquiries)
//! - **orchestrator**: Engine, hourly tick, operations, snapshots
//!
//! # Critical Invariants
//!
//! 1. Triage scores stay in `1..=5`
//! 2. A bed, room, surgeon or nurse serves at most one patient
//! 3. All randomness is deterministic (one seeded RNG, owned by the engine)
//! 4. Declined operations leave state unchanged

// Module declarations
pub mod arrivals;
pub mod core;
pub mod events;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod resources;
pub mod rng;

// Re-exports for convenience
pub use arrivals::{PopulationConfig, PopulationGenerator, WaveConfig};
pub use crate::core::time::SimClock;
pub use models::{
    blood::{BloodDraw, BloodType},
    event::{Event, EventLog, EventObserver},
    patient::{Patient, PatientStatus},
    staff::{StaffMember, StaffRole},
};
pub use orchestrator::{
    ConfigError, Engine, EngineConfig, Operation, OperationError, OperationReport, StateSnapshot,
    TickReport,
};
pub use policy::PolicyVariant;
pub use resources::{ResourceError, ResourceManager};
pub use rng::RngManager;
