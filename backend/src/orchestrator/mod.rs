//! Orchestrator - the simulation engine and its surface
//!
//! - `config`: [`EngineConfig`], validation and hashing
//! - `engine`: [`Engine`], the tick loop and the patient operations
//! - `operations`: the [`Operation`] set, reports and error taxonomy
//! - `snapshot`: read-only [`StateSnapshot`] and [`Metrics`]

pub mod config;
pub mod engine;
pub mod operations;
pub mod snapshot;


pub use config::{default_blood_supply, ClinicalRules, ConfigError, EngineConfig};
pub use engine::{Engine, PendingInquiry};
pub use operations::{
    DeclineReason, Operation, OperationError, OperationReport, Outcome, TickReport,
    ValidationError,
};
pub use snapshot::{Metrics, PatientCounts, PatientSummary, StateSnapshot};
