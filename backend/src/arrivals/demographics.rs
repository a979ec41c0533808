//! Demographic and clinical text drawn for generated patients

use crate::models::patient::{Insurance, SocialStatus};
use crate::rng::RngManager;

const FEMALE_NAMES: [&str; 16] = [
    "Amara", "Beatriz", "Chloe", "Danielle", "Elif", "Fatima", "Grace", "Hana", "Ingrid",
    "Julia", "Keiko", "Leila", "Maria", "Nadia", "Olivia", "Priya",
];
const MALE_NAMES: [&str; 16] = [
    "Aaron", "Bilal", "Carlos", "Daniel", "Emeka", "Farid", "George", "Hiroshi", "Ivan",
    "James", "Kwame", "Luca", "Mateo", "Noah", "Omar", "Pavel",
];
const SURNAMES: [&str; 20] = [
    "Abara", "Bauer", "Chen", "Dubois", "Evans", "Ferreira", "Gallagher", "Hughes", "Iyer",
    "Jovanovic", "Kim", "Lopez", "Murphy", "Nguyen", "O'Connor", "Petrov", "Quinn", "Rossi",
    "Silva", "Turner",
];
const OCCUPATIONS: [&str; 16] = [
    "Teacher", "Electrician", "Accountant", "Student", "Retired", "Bus driver", "Chef",
    "Software developer", "Warehouse worker", "Pharmacist", "Construction worker", "Cashier",
    "Lawyer", "Farmer", "Police officer", "Musician",
];

/// Presenting conditions by triage level (index 0 = triage 1)
const CONDITIONS: [&[&str]; 5] = [
    &[
        "Penetrating chest trauma",
        "Massive haemorrhage",
        "Severe head injury",
        "Crush injury with shock",
        "Tension pneumothorax",
    ],
    &[
        "Open femur fracture",
        "Abdominal blunt trauma",
        "Partial thickness burns over 20%",
        "Spinal injury",
        "Compound pelvic fracture",
    ],
    &[
        "Closed forearm fracture",
        "Deep laceration",
        "Smoke inhalation",
        "Dislocated shoulder",
        "Moderate concussion",
    ],
    &[
        "Sprained ankle",
        "Superficial burns",
        "Minor laceration",
        "Rib contusion",
    ],
    &[
        "Minor abrasions",
        "Acute stress reaction",
        "Bruising",
        "Dust in eyes",
    ],
];

/// Age at or above which the elevated DNR probability applies
pub const ELDERLY_AGE: u8 = 75;

pub(crate) fn draw_sex(rng: &mut RngManager) -> char {
    if rng.chance(0.5) {
        'F'
    } else {
        'M'
    }
}

pub(crate) fn draw_name(rng: &mut RngManager, sex: char) -> String {
    let first = if sex == 'F' {
        FEMALE_NAMES[rng.index(FEMALE_NAMES.len())]
    } else {
        MALE_NAMES[rng.index(MALE_NAMES.len())]
    };
    let last = SURNAMES[rng.index(SURNAMES.len())];
    format!("{} {}", first, last)
}

pub(crate) fn draw_age(rng: &mut RngManager) -> u8 {
    rng.range(1, 96) as u8
}

pub(crate) fn draw_occupation(rng: &mut RngManager, age: u8) -> String {
    let pick = OCCUPATIONS[rng.index(OCCUPATIONS.len())];
    match age {
        0..=17 => "Student".to_string(),
        a if a >= 68 => "Retired".to_string(),
        _ => pick.to_string(),
    }
}

pub(crate) fn draw_social_status(rng: &mut RngManager) -> SocialStatus {
    match rng.weighted_index(&[0.87, 0.03, 0.10]) {
        0 => SocialStatus::Standard,
        1 => SocialStatus::Vip,
        _ => SocialStatus::Disadvantaged,
    }
}

pub(crate) fn draw_insurance(rng: &mut RngManager, status: SocialStatus) -> Insurance {
    let weights = match status {
        SocialStatus::Vip => [0.95, 0.05, 0.0],
        SocialStatus::Disadvantaged => [0.0, 0.35, 0.65],
        SocialStatus::Standard => [0.50, 0.38, 0.12],
    };
    match rng.weighted_index(&weights) {
        0 => Insurance::Private,
        1 => Insurance::Public,
        _ => Insurance::Uninsured,
    }
}

/// `triage` must already be clamped to 1..=5
pub(crate) fn draw_condition(rng: &mut RngManager, triage: u8) -> String {
    let options = CONDITIONS[usize::from(triage.saturating_sub(1)).min(4)];
    options[rng.index(options.len())].to_string()
}
