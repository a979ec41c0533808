//! Transfusions: compatibility, atomic draws, clinical indication

mod common;

use common::*;
use std::collections::BTreeMap;
use triage_simulator_core_rs::models::patient::{
    ClinicalProfile, FamilyContext, Patient, SocialStatus,
};
use triage_simulator_core_rs::orchestrator::{
    DeclineReason, EngineConfig, OperationError, ValidationError,
};
use triage_simulator_core_rs::{BloodDraw, BloodType, Engine, Event};

fn bleeding(id: &str, blood_type: BloodType, units: u32) -> Patient {
    Patient::new(
        id.to_string(),
        0,
        demographics(SocialStatus::Standard),
        ClinicalProfile {
            blood_type,
            needs_blood: true,
            blood_units_needed: units,
            ..clinical(2)
        },
        FamilyContext::absent(),
    )
}

fn universal_donor_only(units: u32) -> EngineConfig {
    EngineConfig {
        blood_supply: BTreeMap::from([(BloodType::ONeg, units)]),
        ..quiet_config()
    }
}

#[test]
fn test_rare_recipient_draws_universal_donor() {
    let mut engine = engine_with(
        universal_donor_only(5),
        vec![bleeding("P001", BloodType::AbNeg, 2)],
    );

    let report = engine.administer_blood("P001", 2).unwrap();

    assert_eq!(
        report.events,
        vec![Event::BloodAdministered {
            hour: 0,
            patient_id: "P001".to_string(),
            units: 2,
            draws: vec![BloodDraw {
                blood_type: BloodType::ONeg,
                units: 2
            }],
            clinically_indicated: true,
        }]
    );
    let bank = engine.resources().blood_bank();
    assert_eq!(bank.units(BloodType::ONeg), 3);
    assert_eq!(bank.units_consumed(), 2);

    let p = engine.patient("P001").unwrap();
    assert_eq!(p.blood_units_received(), 2);
    assert!(!p.needs_blood());
}

#[test]
fn test_insufficient_stock_is_declined_atomically() {
    let mut engine = engine_with(
        universal_donor_only(3),
        vec![bleeding("P001", BloodType::AbNeg, 4)],
    );
    let before = engine.get_state().digest().unwrap();

    let err = engine.administer_blood("P001", 4).unwrap_err();

    assert_eq!(
        err,
        OperationError::Declined(DeclineReason::InsufficientBlood {
            recipient: BloodType::AbNeg,
            requested: 4,
            available: 3,
        })
    );
    assert_eq!(engine.resources().blood_bank().units(BloodType::ONeg), 3);
    assert_eq!(engine.patient("P001").unwrap().blood_units_received(), 0);
    assert_eq!(engine.get_state().digest().unwrap(), before);
}

#[test]
fn test_incompatible_stock_is_not_used() {
    let config = EngineConfig {
        blood_supply: BTreeMap::from([(BloodType::APos, 20), (BloodType::BPos, 20)]),
        ..quiet_config()
    };
    let mut engine = engine_with(config, vec![bleeding("P001", BloodType::ONeg, 1)]);

    assert_eq!(
        engine.administer_blood("P001", 1).unwrap_err(),
        OperationError::Declined(DeclineReason::InsufficientBlood {
            recipient: BloodType::ONeg,
            requested: 1,
            available: 0,
        })
    );
}

#[test]
fn test_unit_bounds() {
    let mut engine = engine_with(quiet_config(), vec![bleeding("P001", BloodType::APos, 2)]);

    for units in [0, 11] {
        assert_eq!(
            engine.administer_blood("P001", units).unwrap_err(),
            OperationError::Validation(ValidationError::InvalidBloodUnits { units, max: 10 })
        );
    }
    assert!(engine.administer_blood("P001", 10).is_ok());
}

#[test]
fn test_transfusion_without_need_is_flagged() {
    let mut engine = engine_with(quiet_config(), vec![patient("P001", 0, 3)]);

    let report = engine.administer_blood("P001", 1).unwrap();

    assert!(matches!(
        &report.events[..],
        [Event::BloodAdministered {
            clinically_indicated: false,
            ..
        }]
    ));
}

#[test]
fn test_partial_transfusion_keeps_need() {
    let mut engine = engine_with(quiet_config(), vec![bleeding("P001", BloodType::OPos, 4)]);

    engine.administer_blood("P001", 1).unwrap();
    assert!(engine.patient("P001").unwrap().needs_blood());

    let report = engine.administer_blood("P001", 3).unwrap();
    assert!(matches!(
        &report.events[..],
        [Event::BloodAdministered {
            clinically_indicated: true,
            ..
        }]
    ));
    assert!(!engine.patient("P001").unwrap().needs_blood());
}

#[test]
fn test_no_blood_for_the_dead() {
    let mut config = universal_donor_only(5);
    config.clinical.critical_death_probability = 1.0;
    let roster = vec![Patient::new(
        "P001".to_string(),
        0,
        demographics(SocialStatus::Standard),
        ClinicalProfile {
            blood_type: BloodType::ONeg,
            needs_blood: true,
            blood_units_needed: 2,
            ..clinical(1)
        },
        FamilyContext::absent(),
    )];
    let mut engine: Engine = engine_with(config, roster);
    tick_n(&mut engine, 3);
    assert_eq!(engine.deaths(), 1);

    assert!(matches!(
        engine.administer_blood("P001", 1).unwrap_err(),
        OperationError::Validation(ValidationError::InvalidState { .. })
    ));
    assert_eq!(engine.resources().blood_bank().units(BloodType::ONeg), 5);
}

#[test]
fn test_stock_never_exceeds_initial_supply() {
    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    let initial = engine.resources().initial_blood_supply().clone();

    let ids: Vec<String> = engine
        .waiting_queue()
        .iter()
        .map(|p| p.id().to_string())
        .collect();
    for id in ids {
        let _ = engine.administer_blood(&id, 3);
    }

    for (blood_type, units) in engine.resources().blood_inventory() {
        assert!(*units <= initial[blood_type]);
    }
}
