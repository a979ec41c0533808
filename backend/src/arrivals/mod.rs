//! Patient population generation
//!
//! Builds the full roster for a run up front from the engine's RNG.
//!
//! # Generation Flow
//!
//! ```text
//! for each wave (in order):
//!     count = round(total × share)   (last wave takes the remainder)
//!     for each patient: demographics → triage → condition → blood type
//!                       → arrival hour → surgery/blood needs → DNR → family
//! stable sort by arrival hour
//! assign ids P001, P002, … in arrival order
//! apply scripted dilemma overrides (no RNG)
//! ```
//!
//! # Key Principles
//!
//! 1. **Determinism**: same seed + same config → byte-identical roster
//! 2. **Fixed draw order**: every patient consumes draws in the order above
//! 3. **Scripted dilemmas**: overrides depend only on slot position, so every
//!    run with a given seed faces the same dilemmas
//!
//! # Example
//!
//! ```
//! use triage_simulator_core_rs::arrivals::{PopulationConfig, PopulationGenerator};
//! use triage_simulator_core_rs::rng::RngManager;
//!
//! let generator = PopulationGenerator::new(PopulationConfig::default(), 72);
//! let roster = generator.generate(&mut RngManager::new(42));
//!
//! assert_eq!(roster.len(), 200);
//! assert_eq!(roster[0].id(), "P001");
//! assert!(roster.windows(2).all(|w| w[0].arrival_hour() <= w[1].arrival_hour()));
//! ```

pub mod demographics;
pub mod dilemmas;

use crate::core::digest::canonical_digest;
use crate::models::blood::BloodType;
use crate::models::patient::{ClinicalProfile, Demographics, FamilyContext, Patient};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// One time-boxed arrival wave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub name: String,
    /// First hour of the window (inclusive)
    pub start_hour: usize,
    /// End of the window (exclusive)
    pub end_hour: usize,
    /// Fraction of the total population. Ignored for the last wave, which
    /// takes whatever remains.
    pub share: f64,
    /// Relative weights for triage 1..=5
    pub triage_weights: [f64; 5],
}

impl WaveConfig {
    fn new(name: &str, start_hour: usize, end_hour: usize, share: f64, weights: [f64; 5]) -> Self {
        Self {
            name: name.to_string(),
            start_hour,
            end_hour,
            share,
            triage_weights: weights,
        }
    }
}

/// Population parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub total_patients: usize,
    pub waves: Vec<WaveConfig>,
    /// Indexed by triage - 1
    pub surgery_probability: [f64; 5],
    pub blood_probability: [f64; 5],
    pub deterioration_rates: [u32; 5],
    pub max_blood_units: u32,
    pub dnr_probability: f64,
    pub elderly_dnr_probability: f64,
    pub family_presence_probability: f64,
    /// Apply the scripted dilemma overrides after generation
    pub scripted_dilemmas: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            total_patients: 200,
            waves: vec![
                WaveConfig::new("initial_surge", 0, 6, 0.40, [0.30, 0.30, 0.20, 0.12, 0.08]),
                WaveConfig::new("secondary_wave", 6, 24, 0.35, [0.15, 0.25, 0.30, 0.20, 0.10]),
                WaveConfig::new("late_trickle", 24, 72, 0.25, [0.05, 0.15, 0.30, 0.30, 0.20]),
            ],
            surgery_probability: [0.70, 0.50, 0.25, 0.08, 0.02],
            blood_probability: [0.60, 0.40, 0.15, 0.05, 0.0],
            deterioration_rates: [2, 3, 4, 6, 8],
            max_blood_units: 4,
            dnr_probability: 0.02,
            elderly_dnr_probability: 0.08,
            family_presence_probability: 0.5,
            scripted_dilemmas: true,
        }
    }
}

impl PopulationConfig {
    /// Number of patients generated in each wave
    ///
    /// Non-final waves get `round(total × share)`, never more than what is
    /// left; the final wave takes the remainder so the sum is always
    /// `total_patients`.
    pub fn wave_counts(&self) -> Vec<usize> {
        let mut remaining = self.total_patients;
        let last = self.waves.len().saturating_sub(1);
        self.waves
            .iter()
            .enumerate()
            .map(|(i, wave)| {
                let n = if i == last {
                    remaining
                } else {
                    ((self.total_patients as f64 * wave.share).round() as usize).min(remaining)
                };
                remaining -= n;
                n
            })
            .collect()
    }

    pub(crate) fn deterioration_rate(&self, triage: u8) -> u32 {
        self.deterioration_rates[triage_index(triage)]
    }
}

fn triage_index(triage: u8) -> usize {
    usize::from(triage.clamp(1, 5) - 1)
}

/// A generated patient tagged with the wave it came from
#[derive(Debug, Clone)]
pub(crate) struct Arrival {
    pub wave: usize,
    pub patient: Patient,
}

/// Deterministic roster generator
#[derive(Debug, Clone)]
pub struct PopulationGenerator {
    config: PopulationConfig,
    duration_hours: usize,
}

impl PopulationGenerator {
    pub fn new(config: PopulationConfig, duration_hours: usize) -> Self {
        Self {
            config,
            duration_hours,
        }
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Generate the full roster, sorted by arrival hour with ids assigned
    pub fn generate(&self, rng: &mut RngManager) -> Vec<Patient> {
        let mut arrivals = Vec::with_capacity(self.config.total_patients);

        for (wave_idx, count) in self.config.wave_counts().into_iter().enumerate() {
            let wave = &self.config.waves[wave_idx];
            for _ in 0..count {
                arrivals.push(Arrival {
                    wave: wave_idx,
                    patient: self.draw_patient(wave, rng),
                });
            }
        }

        arrivals.sort_by_key(|a| a.patient.arrival_hour());
        for (i, arrival) in arrivals.iter_mut().enumerate() {
            arrival.patient.set_id(format!("P{:03}", i + 1));
        }

        if self.config.scripted_dilemmas {
            dilemmas::apply_overrides(&mut arrivals, &self.config);
        }

        arrivals.into_iter().map(|a| a.patient).collect()
    }

    /// Arrival window clipped to the run
    fn window(&self, wave: &WaveConfig) -> (usize, usize) {
        let last_hour = self.duration_hours.saturating_sub(1);
        let start = wave.start_hour.min(last_hour);
        let end = wave.end_hour.min(self.duration_hours).max(start + 1);
        (start, end)
    }

    fn draw_patient(&self, wave: &WaveConfig, rng: &mut RngManager) -> Patient {
        let cfg = &self.config;

        let sex = demographics::draw_sex(rng);
        let name = demographics::draw_name(rng, sex);
        let age = demographics::draw_age(rng);
        let occupation = demographics::draw_occupation(rng, age);
        let social_status = demographics::draw_social_status(rng);
        let insurance = demographics::draw_insurance(rng, social_status);

        let triage = rng.weighted_index(&wave.triage_weights) as u8 + 1;
        let t = triage_index(triage);
        let condition = demographics::draw_condition(rng, triage);
        let blood_type = BloodType::ALL[rng.index(BloodType::ALL.len())];

        let (start, end) = self.window(wave);
        let arrival_hour = rng.range(start as i64, end as i64) as usize;

        let needs_surgery = rng.chance(cfg.surgery_probability[t]);
        let needs_blood = rng.chance(cfg.blood_probability[t]);
        let blood_units_needed = if needs_blood {
            rng.range(1, i64::from(cfg.max_blood_units.max(1)) + 1) as u32
        } else {
            0
        };

        let dnr_p = if age >= demographics::ELDERLY_AGE {
            cfg.elderly_dnr_probability
        } else {
            cfg.dnr_probability
        };
        let has_dnr = rng.chance(dnr_p);

        let family = if rng.chance(cfg.family_presence_probability) {
            FamilyContext {
                present: true,
                anxiety: rng.range(20, 61) as u8,
            }
        } else {
            FamilyContext::absent()
        };

        Patient::new(
            String::new(),
            arrival_hour,
            Demographics {
                name,
                age,
                sex,
                occupation,
                social_status,
                insurance,
            },
            ClinicalProfile {
                triage,
                condition,
                blood_type,
                needs_surgery,
                needs_blood,
                blood_units_needed,
                has_dnr,
                deterioration_rate: cfg.deterioration_rate(triage),
            },
            family,
        )
    }
}

/// SHA-256 fingerprint of a roster
///
/// Two rosters with the same digest are byte-identical in their serialized
/// form.
pub fn roster_digest(patients: &[Patient]) -> Result<String, serde_json::Error> {
    canonical_digest(patients)
}
