//! Casualty roster generation through the public API

use triage_simulator_core_rs::models::patient::{SocialStatus, TRIAGE_MAX, TRIAGE_MIN};
use triage_simulator_core_rs::{Patient, PopulationConfig, PopulationGenerator, RngManager};

fn roster(config: PopulationConfig, duration: usize, seed: u64) -> Vec<Patient> {
    PopulationGenerator::new(config, duration).generate(&mut RngManager::new(seed))
}

fn find<'a>(patients: &'a [Patient], name: &str) -> Option<&'a Patient> {
    patients.iter().find(|p| p.name() == name)
}

#[test]
fn test_roster_shape() {
    let patients = roster(PopulationConfig::default(), 72, 42);

    assert_eq!(patients.len(), 200);
    for (i, p) in patients.iter().enumerate() {
        assert_eq!(p.id(), format!("P{:03}", i + 1));
        assert!((TRIAGE_MIN..=TRIAGE_MAX).contains(&p.triage_score()));
        assert_eq!(p.triage_score(), p.original_triage());
        assert!(p.arrival_hour() < 72);
        assert!(!p.is_admitted());
        assert!(p.family_anxiety() <= 100);
        assert!(p.deterioration_rate() >= 1);
        if !p.needs_blood() {
            assert_eq!(p.blood_units_needed(), 0);
        }
    }
    assert!(patients
        .windows(2)
        .all(|w| w[0].arrival_hour() <= w[1].arrival_hour()));
}

#[test]
fn test_initial_surge_arrives_first() {
    let patients = roster(PopulationConfig::default(), 72, 42);
    let early = patients.iter().filter(|p| p.arrival_hour() < 6).count();
    assert!(early >= 80, "surge produced only {} early arrivals", early);
}

#[test]
fn test_short_run_clips_arrivals() {
    let patients = roster(PopulationConfig::default(), 12, 7);
    assert_eq!(patients.len(), 200);
    assert!(patients.iter().all(|p| p.arrival_hour() < 12));
}

#[test]
fn test_scripted_dilemmas_present() {
    let patients = roster(PopulationConfig::default(), 72, 42);

    let vip = find(&patients, "Richard Ashford").expect("VIP trauma patient");
    let other = find(&patients, "Tomas Reyes").expect("disadvantaged trauma patient");
    assert_eq!(vip.social_status(), SocialStatus::Vip);
    assert_eq!(other.social_status(), SocialStatus::Disadvantaged);
    assert_eq!(vip.triage_score(), other.triage_score());
    assert_eq!(vip.condition(), other.condition());
    assert_eq!(vip.blood_type(), other.blood_type());

    let elderly = find(&patients, "Eleanor Whitfield").expect("DNR patient");
    assert!(elderly.has_dnr());
    assert!(elderly.needs_surgery());

    let senator = find(&patients, "Senator Harold Vance").expect("VIP minor injury");
    assert_eq!(senator.social_status(), SocialStatus::Vip);
    assert_eq!(senator.triage_score(), 4);

    assert!(find(&patients, "Mei Lin Zhao").is_some());
}

#[test]
fn test_dilemmas_can_be_disabled() {
    let config = PopulationConfig {
        scripted_dilemmas: false,
        ..Default::default()
    };
    let patients = roster(config, 72, 42);
    assert!(find(&patients, "Richard Ashford").is_none());
    assert!(find(&patients, "Eleanor Whitfield").is_none());
}

#[test]
fn test_generation_is_seeded() {
    let a = roster(PopulationConfig::default(), 72, 99);
    let b = roster(PopulationConfig::default(), 72, 99);
    assert_eq!(a, b);
}
