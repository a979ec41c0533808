//! Property tests: random operator traces never break engine invariants

use proptest::prelude::*;
use std::collections::BTreeSet;
use triage_simulator_core_rs::models::patient::{MAX_ANXIETY, TRIAGE_MAX, TRIAGE_MIN};
use triage_simulator_core_rs::models::staff::MAX_FATIGUE;
use triage_simulator_core_rs::{Engine, EngineConfig, Event, Operation, PatientStatus};

const STAFF: [&str; 12] = [
    "S01", "S02", "S03", "S04", "N01", "N02", "N03", "N04", "N05", "N06", "N07", "N08",
];

fn to_operation(kind: u8, target: usize, param: u32) -> Operation {
    let patient_id = format!("P{:03}", target % 200 + 1);
    match kind {
        0..=2 => Operation::AdvanceHour,
        3 => Operation::AssignBed { patient_id },
        4 => Operation::ScheduleSurgery {
            patient_id,
            surgeon_id: None,
            room_id: None,
        },
        5 => Operation::DischargePatient { patient_id },
        6 => Operation::AdministerBlood {
            patient_id,
            units: param,
        },
        7 => Operation::SetTriage {
            patient_id,
            triage: (param % 7) as u8,
        },
        8 => Operation::SetStaffRest {
            staff_id: STAFF[target % STAFF.len()].to_string(),
            hours: param * 2,
        },
        9 => Operation::UpdateFamily { patient_id },
        _ => Operation::RespondToMedia {
            reported_deaths: param,
        },
    }
}

fn operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec((0u8..11, 0usize..200, 0u32..13), 1..120).prop_map(|raw| {
        raw.into_iter()
            .map(|(kind, target, param)| to_operation(kind, target, param))
            .collect()
    })
}

fn check_invariants(engine: &Engine) -> Result<(), TestCaseError> {
    let resources = engine.resources();
    let mut bedded = 0;

    for p in engine.patients() {
        prop_assert!((TRIAGE_MIN..=TRIAGE_MAX).contains(&p.triage_score()));
        prop_assert!(p.family_anxiety() <= MAX_ANXIETY);

        if p.status().holds_bed() {
            bedded += 1;
            let bed = p.bed_id();
            prop_assert!(bed.is_some(), "{} holds no bed id", p.id());
            prop_assert_eq!(resources.bed_occupant(bed.unwrap_or_default()), Some(p.id()));
        } else {
            prop_assert_eq!(p.bed_id(), None);
            prop_assert_eq!(resources.bed_of(p.id()), None);
        }
        if p.status() == PatientStatus::InSurgery {
            prop_assert!(resources.room_of(p.id()).is_some());
        }
    }
    prop_assert_eq!(bedded, resources.bed_count() - resources.available_beds().len());

    for s in resources.all_staff() {
        prop_assert!((0.0..=MAX_FATIGUE).contains(&s.fatigue()));
        prop_assert!(!(s.is_resting() && s.current_patient().is_some()));
    }

    let initial = resources.initial_blood_supply();
    for (blood_type, units) in resources.blood_inventory() {
        prop_assert!(*units <= initial[blood_type]);
    }
    let transfused: u32 = engine
        .event_log()
        .events()
        .iter()
        .map(|e| match e {
            Event::BloodAdministered { draws, .. } => draws.iter().map(|d| d.units).sum::<u32>(),
            _ => 0,
        })
        .sum();
    prop_assert_eq!(transfused, resources.blood_bank().units_consumed());

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_random_traces_keep_invariants(ops in operations(), seed in 0u64..1000) {
        let config = EngineConfig { seed, ..Default::default() };
        let mut engine = Engine::new(config).unwrap();
        let mut dead: BTreeSet<String> = BTreeSet::new();

        for op in ops {
            let before = engine.get_state().digest().unwrap();
            let result = engine.apply(op);
            if result.is_err() {
                prop_assert_eq!(engine.get_state().digest().unwrap(), before);
            }

            check_invariants(&engine)?;
            for id in &dead {
                prop_assert_eq!(
                    engine.patient(id).map(|p| p.status()),
                    Some(PatientStatus::Deceased)
                );
            }
            dead.extend(
                engine
                    .patients()
                    .iter()
                    .filter(|p| p.status() == PatientStatus::Deceased)
                    .map(|p| p.id().to_string()),
            );
        }
    }

    #[test]
    fn prop_replay_matches_live_run(ops in operations()) {
        let mut live = Engine::new(EngineConfig::default()).unwrap();
        for op in ops {
            let _ = live.apply(op);
        }

        let replayed = Engine::replay(EngineConfig::default(), live.history()).unwrap();
        prop_assert_eq!(
            replayed.get_state().digest().unwrap(),
            live.get_state().digest().unwrap()
        );
    }
}
