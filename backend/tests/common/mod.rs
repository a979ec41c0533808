//! Shared fixtures for integration tests
#![allow(dead_code)]

use triage_simulator_core_rs::models::patient::{
    ClinicalProfile, Demographics, FamilyContext, Insurance, Patient, SocialStatus,
};
use triage_simulator_core_rs::orchestrator::EngineConfig;
use triage_simulator_core_rs::{BloodType, Engine};

/// Small department with no scripted media events and no stochastic deaths
pub fn quiet_config() -> EngineConfig {
    let mut config = EngineConfig {
        beds: 4,
        surgeons: 2,
        nurses: 2,
        operating_rooms: 1,
        scenario_events: Vec::new(),
        ..Default::default()
    };
    config.clinical.critical_death_probability = 0.0;
    config.clinical.prolonged_death_probability = 0.0;
    config
}

pub fn demographics(social_status: SocialStatus) -> Demographics {
    Demographics {
        name: "Alex Morgan".to_string(),
        age: 45,
        sex: 'F',
        occupation: "Engineer".to_string(),
        social_status,
        insurance: Insurance::Public,
    }
}

pub fn clinical(triage: u8) -> ClinicalProfile {
    ClinicalProfile {
        triage,
        condition: "Deep laceration".to_string(),
        blood_type: BloodType::APos,
        needs_surgery: false,
        needs_blood: false,
        blood_units_needed: 0,
        has_dnr: false,
        deterioration_rate: 8,
    }
}

/// Standard patient, no family, no surgery or blood need
pub fn patient(id: &str, arrival_hour: usize, triage: u8) -> Patient {
    Patient::new(
        id.to_string(),
        arrival_hour,
        demographics(SocialStatus::Standard),
        clinical(triage),
        FamilyContext::absent(),
    )
}

pub fn surgical_patient(id: &str, arrival_hour: usize, triage: u8) -> Patient {
    Patient::new(
        id.to_string(),
        arrival_hour,
        demographics(SocialStatus::Standard),
        ClinicalProfile {
            needs_surgery: true,
            ..clinical(triage)
        },
        FamilyContext::absent(),
    )
}

pub fn engine_with(config: EngineConfig, roster: Vec<Patient>) -> Engine {
    Engine::with_roster(config, roster).unwrap()
}

pub fn event_types(events: &[triage_simulator_core_rs::Event]) -> Vec<&'static str> {
    events.iter().map(|e| e.event_type()).collect()
}

pub fn tick_n(engine: &mut Engine, n: usize) {
    for _ in 0..n {
        engine.advance_hour().unwrap();
    }
}
