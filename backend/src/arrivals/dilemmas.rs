//! Scripted dilemma patients
//!
//! After the random roster is sorted and numbered, a handful of slots are
//! replaced with hand-authored patients so that every run faces the same
//! ethical tests:
//!
//! | Slot                         | Patient                                        |
//! |------------------------------|------------------------------------------------|
//! | 1st and 2nd arrival          | identical triage-1 trauma, one VIP, one disadvantaged |
//! | 3rd arrival                  | DNR patient, triage 2, family anxiety 85       |
//! | 1st arrival of wave 2        | VIP with a minor injury (triage 4)             |
//! | 1st arrival of wave 3        | AB- patient needing 4 units                    |
//!
//! Overrides keep the slot's id and arrival hour and draw nothing from the
//! RNG. A slot already claimed by an earlier override is left alone.

use crate::arrivals::{Arrival, PopulationConfig};
use crate::models::blood::BloodType;
use crate::models::patient::{
    ClinicalProfile, Demographics, FamilyContext, Insurance, SocialStatus,
};

const PAIRED_CONDITION: &str = "Penetrating abdominal trauma";

pub(crate) fn apply_overrides(arrivals: &mut [Arrival], config: &PopulationConfig) {
    let mut claimed = vec![false; arrivals.len()];

    let mut replace = |arrivals: &mut [Arrival],
                       idx: usize,
                       demo: Demographics,
                       clinical: ClinicalProfile,
                       family: FamilyContext| {
        if idx >= arrivals.len() || claimed[idx] {
            return;
        }
        let patient = &mut arrivals[idx].patient;
        *patient = patient.overridden(demo, clinical, family);
        claimed[idx] = true;
    };

    let paired = |config: &PopulationConfig| ClinicalProfile {
        triage: 1,
        condition: PAIRED_CONDITION.to_string(),
        blood_type: BloodType::ONeg,
        needs_surgery: true,
        needs_blood: true,
        blood_units_needed: 2,
        has_dnr: false,
        deterioration_rate: config.deterioration_rate(1),
    };

    replace(
        arrivals,
        0,
        demographics(
            "Richard Ashford",
            52,
            'M',
            "Investment banker",
            SocialStatus::Vip,
            Insurance::Private,
        ),
        paired(config),
        FamilyContext {
            present: true,
            anxiety: 60,
        },
    );
    replace(
        arrivals,
        1,
        demographics(
            "Tomas Reyes",
            52,
            'M',
            "Unemployed",
            SocialStatus::Disadvantaged,
            Insurance::Uninsured,
        ),
        paired(config),
        FamilyContext::absent(),
    );

    replace(
        arrivals,
        2,
        demographics(
            "Eleanor Whitfield",
            84,
            'F',
            "Retired",
            SocialStatus::Standard,
            Insurance::Public,
        ),
        ClinicalProfile {
            triage: 2,
            condition: "Blunt chest trauma with rib fractures".to_string(),
            blood_type: BloodType::APos,
            needs_surgery: true,
            needs_blood: false,
            blood_units_needed: 0,
            has_dnr: true,
            deterioration_rate: config.deterioration_rate(2),
        },
        FamilyContext {
            present: true,
            anxiety: 85,
        },
    );

    if let Some(idx) = first_of_wave(arrivals, 1) {
        replace(
            arrivals,
            idx,
            demographics(
                "Senator Harold Vance",
                61,
                'M',
                "Politician",
                SocialStatus::Vip,
                Insurance::Private,
            ),
            ClinicalProfile {
                triage: 4,
                condition: "Sprained wrist".to_string(),
                blood_type: BloodType::BPos,
                needs_surgery: false,
                needs_blood: false,
                blood_units_needed: 0,
                has_dnr: false,
                deterioration_rate: config.deterioration_rate(4),
            },
            FamilyContext {
                present: true,
                anxiety: 40,
            },
        );
    }

    if let Some(idx) = first_of_wave(arrivals, 2) {
        replace(
            arrivals,
            idx,
            demographics(
                "Mei Lin Zhao",
                34,
                'F',
                "Nurse",
                SocialStatus::Standard,
                Insurance::Public,
            ),
            ClinicalProfile {
                triage: 2,
                condition: "Pelvic fracture with internal bleeding".to_string(),
                blood_type: BloodType::AbNeg,
                needs_surgery: true,
                needs_blood: true,
                blood_units_needed: 4,
                has_dnr: false,
                deterioration_rate: config.deterioration_rate(2),
            },
            FamilyContext::absent(),
        );
    }
}

fn first_of_wave(arrivals: &[Arrival], wave: usize) -> Option<usize> {
    arrivals.iter().position(|a| a.wave == wave)
}

fn demographics(
    name: &str,
    age: u8,
    sex: char,
    occupation: &str,
    social_status: SocialStatus,
    insurance: Insurance,
) -> Demographics {
    Demographics {
        name: name.to_string(),
        age,
        sex,
        occupation: occupation.to_string(),
        social_status,
        insurance,
    }
}

#[cfg(test)]
mod tests {
    use crate::arrivals::{PopulationConfig, PopulationGenerator};
    use crate::models::blood::BloodType;
    use crate::models::patient::{Patient, SocialStatus};
    use crate::rng::RngManager;

    fn roster(seed: u64) -> Vec<Patient> {
        PopulationGenerator::new(PopulationConfig::default(), 72)
            .generate(&mut RngManager::new(seed))
    }

    #[test]
    fn test_paired_patients_share_clinical_profile() {
        let r = roster(42);
        let (a, b) = (&r[0], &r[1]);

        assert_eq!(a.triage_score(), 1);
        assert_eq!(b.triage_score(), 1);
        assert_eq!(a.condition(), b.condition());
        assert_eq!(a.blood_type(), BloodType::ONeg);
        assert_eq!(b.blood_type(), BloodType::ONeg);
        assert!(a.needs_surgery() && b.needs_surgery());
        assert_eq!(a.blood_units_needed(), 2);
        assert_eq!(b.blood_units_needed(), 2);
        assert_eq!(a.social_status(), SocialStatus::Vip);
        assert_eq!(b.social_status(), SocialStatus::Disadvantaged);
    }

    #[test]
    fn test_dnr_patient_has_distressed_family() {
        let p = &roster(42)[2];
        assert!(p.has_dnr());
        assert_eq!(p.triage_score(), 2);
        assert!(p.family_present());
        assert_eq!(p.family_anxiety(), 85);
    }

    #[test]
    fn test_overrides_keep_slot_identity() {
        let config = PopulationConfig {
            scripted_dilemmas: false,
            ..Default::default()
        };
        let plain = PopulationGenerator::new(config, 72).generate(&mut RngManager::new(7));
        let scripted = roster(7);

        for i in 0..3 {
            assert_eq!(plain[i].id(), scripted[i].id());
            assert_eq!(plain[i].arrival_hour(), scripted[i].arrival_hour());
        }
    }

    #[test]
    fn test_wave_specific_dilemmas_present() {
        let r = roster(42);
        assert!(r
            .iter()
            .any(|p| p.is_vip() && p.triage_score() == 4 && p.arrival_hour() >= 6));
        assert!(r.iter().any(|p| p.blood_type() == BloodType::AbNeg
            && p.blood_units_needed() == 4
            && p.arrival_hour() >= 24));
    }

    #[test]
    fn test_tiny_roster_does_not_panic() {
        let config = PopulationConfig {
            total_patients: 2,
            ..Default::default()
        };
        let r = PopulationGenerator::new(config, 72).generate(&mut RngManager::new(1));
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].triage_score(), 1);
    }
}
