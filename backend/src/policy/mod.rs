//! Allocation Policy Module
//!
//! Decides what happens when an operation breaks one of the department's
//! allocation rules.
//!
//! # Rules
//!
//! - [`PolicyRule::TriageOrder`]: a resource goes to a patient while a more
//!   critical (numerically lower triage) patient is still waiting
//! - [`PolicyRule::MandatoryRest`]: a surgeon with at least
//!   `max_continuous_hours` on the clock is put into surgery
//!
//! # Variants
//!
//! | Variant  | TriageOrder | MandatoryRest |
//! |----------|-------------|---------------|
//! | Standard | record      | record        |
//! | Strict   | block       | block         |
//!
//! "Record" lets the operation through and emits a conduct event for the
//! scoring side. "Block" declines the operation with no state change.
//!
//! # Example
//!
//! ```rust
//! use triage_simulator_core_rs::policy::{Enforcement, PolicyRule, PolicyVariant};
//!
//! let strict = PolicyVariant::Strict.build();
//! assert_eq!(strict.enforcement(PolicyRule::TriageOrder), Enforcement::Block);
//!
//! let standard = PolicyVariant::Standard.build();
//! assert_eq!(standard.enforcement(PolicyRule::TriageOrder), Enforcement::Record);
//! ```

use crate::models::patient::Patient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule an operation may violate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyRule {
    TriageOrder,
    MandatoryRest,
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRule::TriageOrder => f.write_str("triage order"),
            PolicyRule::MandatoryRest => f.write_str("mandatory rest"),
        }
    }
}

/// What to do with a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// Allow the operation and emit an event
    Record,
    /// Decline the operation
    Block,
}

/// Interface for allocation policies
///
/// Policies are pure: they look at the rule only, never at engine state, so
/// swapping variants cannot change the RNG stream.
pub trait AllocationPolicy {
    fn name(&self) -> &'static str;

    fn enforcement(&self, rule: PolicyRule) -> Enforcement;
}

/// Records every violation and never blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPolicy;

impl AllocationPolicy for StandardPolicy {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn enforcement(&self, _rule: PolicyRule) -> Enforcement {
        Enforcement::Record
    }
}

/// Blocks triage skips and overtime surgery
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictPolicy;

impl AllocationPolicy for StrictPolicy {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn enforcement(&self, rule: PolicyRule) -> Enforcement {
        match rule {
            PolicyRule::TriageOrder | PolicyRule::MandatoryRest => Enforcement::Block,
        }
    }
}

/// Policy selection in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyVariant {
    #[default]
    Standard,
    Strict,
}

impl PolicyVariant {
    pub fn build(self) -> Box<dyn AllocationPolicy> {
        match self {
            PolicyVariant::Standard => Box::new(StandardPolicy),
            PolicyVariant::Strict => Box::new(StrictPolicy),
        }
    }
}

/// Most critical admitted Waiting patient that `candidate` would jump ahead of
///
/// Returns the waiting patient with the lowest triage score strictly below
/// the candidate's; ties go to the earliest in roster (arrival) order. The
/// candidate itself is never returned.
pub fn find_skipped_patient<'a, I>(waiting: I, candidate: &Patient) -> Option<&'a Patient>
where
    I: IntoIterator<Item = &'a Patient>,
{
    let mut best: Option<&'a Patient> = None;
    for p in waiting {
        if p.id() == candidate.id() || !p.is_waiting() {
            continue;
        }
        if p.triage_score() >= candidate.triage_score() {
            continue;
        }
        match best {
            Some(b) if b.triage_score() <= p.triage_score() => {}
            _ => best = Some(p),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::blood::BloodType;
    use crate::models::patient::*;

    fn waiting(id: &str, triage: u8) -> Patient {
        let mut p = Patient::new(
            id.to_string(),
            0,
            Demographics {
                name: id.to_string(),
                age: 30,
                sex: 'F',
                occupation: "Nurse".to_string(),
                social_status: SocialStatus::Standard,
                insurance: Insurance::Public,
            },
            ClinicalProfile {
                triage,
                condition: "Burns".to_string(),
                blood_type: BloodType::APos,
                needs_surgery: false,
                needs_blood: false,
                blood_units_needed: 0,
                has_dnr: false,
                deterioration_rate: 4,
            },
            FamilyContext::absent(),
        );
        p.admit(0);
        p
    }

    #[test]
    fn test_no_skip_when_candidate_most_critical() {
        let roster = vec![waiting("P001", 1), waiting("P002", 3)];
        assert!(find_skipped_patient(&roster, &roster[0]).is_none());
    }

    #[test]
    fn test_equal_triage_is_not_a_skip() {
        let roster = vec![waiting("P001", 2), waiting("P002", 2)];
        assert!(find_skipped_patient(&roster, &roster[1]).is_none());
    }

    #[test]
    fn test_picks_most_critical_then_earliest() {
        let roster = vec![
            waiting("P001", 2),
            waiting("P002", 1),
            waiting("P003", 1),
            waiting("P004", 4),
        ];
        let skipped = find_skipped_patient(&roster, &roster[3]).unwrap();
        assert_eq!(skipped.id(), "P002");
    }

    #[test]
    fn test_unadmitted_patients_ignored() {
        let mut roster = vec![waiting("P001", 3), waiting("P002", 1)];
        roster[1] = Patient::new(
            "P002".to_string(),
            10,
            roster[1].demographics().clone(),
            ClinicalProfile {
                triage: 1,
                condition: "Crush injury".to_string(),
                blood_type: BloodType::ONeg,
                needs_surgery: true,
                needs_blood: true,
                blood_units_needed: 2,
                has_dnr: false,
                deterioration_rate: 2,
            },
            FamilyContext::absent(),
        );
        assert!(find_skipped_patient(&roster, &roster[0]).is_none());
    }

    #[test]
    fn test_variant_serde_names() {
        let v: PolicyVariant = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(v, PolicyVariant::Strict);
        assert_eq!(v.build().name(), "strict");
    }
}
