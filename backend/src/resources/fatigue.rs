//! Staff fatigue and error model
//!
//! Fatigue accrues per worked hour on a tiered curve and is shed at a flat
//! rate while resting:
//!
//! ```text
//! continuous hour  1..=8   +2
//! continuous hour  9..=12  +4
//! continuous hour 13..     +6        (capped at 100)
//! resting                  -8 / hour (floored at 0)
//! ```
//!
//! Staff assigned to a patient roll for a treatment error each worked hour.
//! The probability is 0 below fatigue 40 and rises linearly to 0.30 at 100.

use crate::models::staff::MAX_FATIGUE;
use crate::resources::ResourceManager;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Parameters of the fatigue curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueModel {
    /// Fatigue per hour for the first `base_hours` continuous hours
    pub base_rate: f64,
    pub base_hours: u32,
    /// Fatigue per hour up to `extended_hours`
    pub extended_rate: f64,
    pub extended_hours: u32,
    /// Fatigue per hour beyond `extended_hours`
    pub overtime_rate: f64,
    /// Fatigue below which no errors occur
    pub error_threshold: f64,
    /// Error probability at fatigue 100
    pub max_error_probability: f64,
    pub rest_recovery_per_hour: f64,
}

impl Default for FatigueModel {
    fn default() -> Self {
        Self {
            base_rate: 2.0,
            base_hours: 8,
            extended_rate: 4.0,
            extended_hours: 12,
            overtime_rate: 6.0,
            error_threshold: 40.0,
            max_error_probability: 0.30,
            rest_recovery_per_hour: 8.0,
        }
    }
}

impl FatigueModel {
    /// Fatigue added for the `continuous_hour`-th hour of a shift (1-based)
    ///
    /// # Example
    /// ```rust
    /// use triage_simulator_core_rs::resources::FatigueModel;
    ///
    /// let model = FatigueModel::default();
    /// let after_nine: f64 = (1..=9).map(|h| model.increment_for_hour(h)).sum();
    /// assert_eq!(after_nine, 20.0);
    /// ```
    pub fn increment_for_hour(&self, continuous_hour: u32) -> f64 {
        if continuous_hour <= self.base_hours {
            self.base_rate
        } else if continuous_hour <= self.extended_hours {
            self.extended_rate
        } else {
            self.overtime_rate
        }
    }

    /// Per-hour treatment error probability at a fatigue level
    pub fn error_probability(&self, fatigue: f64) -> f64 {
        if fatigue < self.error_threshold {
            return 0.0;
        }
        let span = MAX_FATIGUE - self.error_threshold;
        if span <= 0.0 {
            return self.max_error_probability;
        }
        let scaled = (fatigue - self.error_threshold) / span;
        (scaled * self.max_error_probability).clamp(0.0, self.max_error_probability)
    }
}

/// A treatment error attributed to fatigue
#[derive(Debug, Clone, PartialEq)]
pub struct FatigueIncident {
    pub staff_id: String,
    pub patient_id: String,
    pub fatigue: f64,
}

/// Outcome of one hour of fatigue accounting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FatigueReport {
    pub incidents: Vec<FatigueIncident>,
    /// `(staff_id, fatigue)` for every rest period that ended this hour
    pub rest_completed: Vec<(String, f64)>,
}

impl ResourceManager {
    /// Advance every staff member by one hour
    ///
    /// Staff are processed in roster order so the RNG stream is stable.
    /// An error roll is drawn only for working staff with a patient and a
    /// non-zero error probability.
    pub fn advance_fatigue(&mut self, rng: &mut RngManager) -> FatigueReport {
        let mut report = FatigueReport::default();
        let model = self.fatigue_model.clone();

        for member in self.staff.iter_mut() {
            if !member.on_duty() {
                continue;
            }

            if member.is_resting() {
                if member.rest_one_hour(model.rest_recovery_per_hour) {
                    report
                        .rest_completed
                        .push((member.id().to_string(), member.fatigue()));
                }
                continue;
            }

            let increment = model.increment_for_hour(member.hours_worked_continuous() + 1);
            member.work_one_hour(increment);

            let Some(patient_id) = member.current_patient().map(str::to_string) else {
                continue;
            };
            let p = model.error_probability(member.fatigue());
            if p > 0.0 && rng.chance(p) {
                member.record_error();
                report.incidents.push(FatigueIncident {
                    staff_id: member.id().to_string(),
                    patient_id,
                    fatigue: member.fatigue(),
                });
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        let m = FatigueModel::default();
        assert_eq!(m.increment_for_hour(1), 2.0);
        assert_eq!(m.increment_for_hour(8), 2.0);
        assert_eq!(m.increment_for_hour(9), 4.0);
        assert_eq!(m.increment_for_hour(12), 4.0);
        assert_eq!(m.increment_for_hour(13), 6.0);
        assert_eq!(m.increment_for_hour(40), 6.0);
    }

    #[test]
    fn test_error_probability_curve() {
        let m = FatigueModel::default();
        assert_eq!(m.error_probability(0.0), 0.0);
        assert_eq!(m.error_probability(39.9), 0.0);
        assert_eq!(m.error_probability(40.0), 0.0);
        assert!((m.error_probability(70.0) - 0.15).abs() < 1e-12);
        assert!((m.error_probability(100.0) - 0.30).abs() < 1e-12);
    }
}
