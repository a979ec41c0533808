//! Engine configuration
//!
//! Everything that shapes a run lives in [`EngineConfig`]. Every field has a
//! default, so a partial JSON document is a valid configuration:
//!
//! ```rust
//! use triage_simulator_core_rs::orchestrator::EngineConfig;
//! use triage_simulator_core_rs::policy::PolicyVariant;
//!
//! let config = EngineConfig::from_json_str(r#"{"seed": 7, "policy": "strict"}"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.policy, PolicyVariant::Strict);
//! assert_eq!(config.beds, 30);
//! ```

use crate::arrivals::PopulationConfig;
use crate::core::digest::canonical_digest;
use crate::events::{EventSchedule, ScheduledEvent};
use crate::models::blood::BloodType;
use crate::models::patient::TRIAGE_MAX;
use crate::policy::PolicyVariant;
use crate::resources::FatigueModel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

/// Clinical thresholds and probabilities used by the hourly tick and the
/// patient operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalRules {
    /// Per-hour death probability for a triage-1 patient waiting at least
    /// `critical_death_wait_hours`
    pub critical_death_probability: f64,
    pub critical_death_wait_hours: u32,

    /// Independent per-hour death probability for a patient at or below
    /// `prolonged_death_max_triage` waiting at least `prolonged_death_wait_hours`
    pub prolonged_death_probability: f64,
    pub prolonged_death_wait_hours: u32,
    pub prolonged_death_max_triage: u8,

    pub readmission_probability: f64,
    /// Hours in bed below which a discharge from Recovering is premature
    pub min_bed_hours: u32,
    /// Hours in bed after which a non-surgical patient starts recovering
    pub bed_treatment_hours: u32,

    /// Hours without an update before family anxiety starts to grow
    pub family_update_threshold_hours: u32,
    pub family_anxiety_growth: u8,
    pub family_distress_threshold: u8,
    pub family_update_relief: u8,

    /// Continuous hours at which a surgeon is on overtime
    pub max_continuous_hours: u32,
    pub max_rest_hours: u32,
    pub max_blood_units_per_request: u32,

    /// Surgery length by triage (index 0 = triage 1)
    pub surgery_hours_by_triage: [usize; 5],
}

impl Default for ClinicalRules {
    fn default() -> Self {
        Self {
            critical_death_probability: 0.4,
            critical_death_wait_hours: 3,
            prolonged_death_probability: 0.2,
            prolonged_death_wait_hours: 8,
            prolonged_death_max_triage: 2,
            readmission_probability: 0.3,
            min_bed_hours: 2,
            bed_treatment_hours: 3,
            family_update_threshold_hours: 4,
            family_anxiety_growth: 10,
            family_distress_threshold: 80,
            family_update_relief: 30,
            max_continuous_hours: 12,
            max_rest_hours: 24,
            max_blood_units_per_request: 10,
            surgery_hours_by_triage: [4, 3, 2, 2, 2],
        }
    }
}

impl ClinicalRules {
    pub fn surgery_hours(&self, triage: u8) -> usize {
        let idx = usize::from(triage.clamp(1, TRIAGE_MAX) - 1);
        self.surgery_hours_by_triage[idx]
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for the engine-owned RNG
    pub seed: u64,

    /// Length of the run in hours
    pub duration_hours: usize,

    pub population: PopulationConfig,

    pub beds: usize,
    pub surgeons: usize,
    pub nurses: usize,
    pub operating_rooms: usize,

    /// Starting units per blood type (missing types start at zero)
    pub blood_supply: BTreeMap<BloodType, u32>,

    pub fatigue: FatigueModel,

    pub policy: PolicyVariant,

    pub clinical: ClinicalRules,

    /// Scripted events (media inquiries)
    pub scenario_events: Vec<ScheduledEvent>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            duration_hours: 72,
            population: PopulationConfig::default(),
            beds: 30,
            surgeons: 4,
            nurses: 8,
            operating_rooms: 3,
            blood_supply: default_blood_supply(),
            fatigue: FatigueModel::default(),
            policy: PolicyVariant::Standard,
            clinical: ClinicalRules::default(),
            scenario_events: vec![
                ScheduledEvent::media_inquiry_at(12, "Casualty numbers after the first night"),
                ScheduledEvent::media_inquiry_at(
                    24,
                    "Reports of patients dying in the waiting area",
                ),
                ScheduledEvent::media_inquiry_at(48, "Final death toll"),
            ],
        }
    }
}

/// Regional stock for a mid-sized trauma centre
pub fn default_blood_supply() -> BTreeMap<BloodType, u32> {
    BTreeMap::from([
        (BloodType::ONeg, 20),
        (BloodType::OPos, 30),
        (BloodType::ANeg, 8),
        (BloodType::APos, 25),
        (BloodType::BNeg, 4),
        (BloodType::BPos, 10),
        (BloodType::AbNeg, 2),
        (BloodType::AbPos, 5),
    ])
}

impl EngineConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA-256 of the canonical JSON form; equal configs hash equally
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        Ok(canonical_digest(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_hours == 0 {
            return Err(invalid("duration_hours must be > 0"));
        }
        if self.beds == 0 {
            return Err(invalid("beds must be > 0"));
        }

        let pop = &self.population;
        if pop.waves.is_empty() {
            return Err(invalid("population must have at least one wave"));
        }
        for wave in &pop.waves {
            if wave.start_hour >= wave.end_hour {
                return Err(invalid(format!(
                    "wave '{}' has an empty window {}..{}",
                    wave.name, wave.start_hour, wave.end_hour
                )));
            }
            if !(0.0..=1.0).contains(&wave.share) {
                return Err(invalid(format!("wave '{}' share must be in [0, 1]", wave.name)));
            }
            if wave.triage_weights.iter().any(|w| *w < 0.0)
                || wave.triage_weights.iter().sum::<f64>() <= 0.0
            {
                return Err(invalid(format!(
                    "wave '{}' needs non-negative triage weights with a positive sum",
                    wave.name
                )));
            }
        }
        let shares: f64 = pop.waves.iter().rev().skip(1).map(|w| w.share).sum();
        if shares > 1.0 + 1e-9 {
            return Err(invalid("wave shares exceed 1.0"));
        }
        if pop.deterioration_rates.contains(&0) {
            return Err(invalid("deterioration rates must be >= 1"));
        }

        let probabilities = [
            ("critical_death_probability", self.clinical.critical_death_probability),
            ("prolonged_death_probability", self.clinical.prolonged_death_probability),
            ("readmission_probability", self.clinical.readmission_probability),
            ("dnr_probability", pop.dnr_probability),
            ("elderly_dnr_probability", pop.elderly_dnr_probability),
            ("family_presence_probability", pop.family_presence_probability),
        ];
        for (name, p) in probabilities
            .into_iter()
            .chain(pop.surgery_probability.iter().map(|p| ("surgery_probability", *p)))
            .chain(pop.blood_probability.iter().map(|p| ("blood_probability", *p)))
        {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{} must be in [0, 1], got {}", name, p)));
            }
        }

        if self.clinical.surgery_hours_by_triage.contains(&0) {
            return Err(invalid("surgery durations must be >= 1 hour"));
        }
        if self.clinical.max_rest_hours == 0 {
            return Err(invalid("max_rest_hours must be > 0"));
        }
        if self.clinical.max_blood_units_per_request == 0 {
            return Err(invalid("max_blood_units_per_request must be > 0"));
        }

        for scheduled in &self.scenario_events {
            if let EventSchedule::Repeating { interval: 0, .. } = scheduled.schedule {
                return Err(invalid("repeating scenario events need interval > 0"));
            }
        }

        Ok(())
    }
}
