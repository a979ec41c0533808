//! Simulation Engine
//!
//! Owns the patient roster, the [`ResourceManager`], the clock and the only
//! RNG of a run, and exposes the hourly tick plus the patient-facing
//! operations.
//!
//! # Tick Loop
//!
//! ```text
//! advance_hour():
//! 1. Admit patients whose arrival hour has been reached
//! 2. Deteriorate waiting patients (not those admitted this hour)
//! 3. Bed hours, bed-only treatment completion, surgery completion
//! 4. Staff fatigue, fatigue errors, rest completion
//! 5. Scheduled media inquiries
//! 6. Family anxiety
//! 7. Stochastic deaths in the waiting queue (arrival order)
//! 8. Recompute metrics
//! ```
//!
//! The phase order is fixed regardless of what operations ran in between.
//!
//! # Operations
//!
//! Every operation goes through the same pipeline: validate the request,
//! check the allocation policy, reserve resources, then commit. Anything
//! that fails before the commit returns an [`OperationError`] with state
//! untouched.
//!
//! # Example
//!
//! ```rust
//! use triage_simulator_core_rs::orchestrator::{Engine, EngineConfig};
//!
//! let mut engine = Engine::new(EngineConfig::default()).unwrap();
//! let waiting = engine.waiting_queue()[0].id().to_string();
//!
//! let report = engine.assign_bed(&waiting).unwrap();
//! assert!(report.has_event("BedAssigned"));
//!
//! let tick = engine.advance_hour().unwrap();
//! assert_eq!(tick.hour, 1);
//! ```

use crate::arrivals::PopulationGenerator;
use crate::core::time::SimClock;
use crate::events::{ScenarioEvent, ScenarioEventHandler};
use crate::models::event::{Event, EventLog, EventObserver};
use crate::models::patient::{Patient, PatientStatus, TRIAGE_MAX, TRIAGE_MIN};
use crate::models::staff::StaffRole;
use crate::orchestrator::config::{ConfigError, EngineConfig};
use crate::orchestrator::operations::{
    DeclineReason, Operation, OperationError, OperationReport, Outcome, TickReport,
    ValidationError,
};
use crate::orchestrator::snapshot::{Metrics, PatientCounts, PatientSummary, StateSnapshot};
use crate::policy::{find_skipped_patient, AllocationPolicy, Enforcement, PolicyRule};
use crate::resources::{ResourceError, ResourceManager};
use crate::rng::RngManager;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A media inquiry waiting for a response
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInquiry {
    pub inquiry_id: String,
    pub topic: String,
    pub hour: usize,
}

/// Patient selected by the triage-order check
struct Skip {
    skipped_id: String,
    skipped_triage: u8,
}

/// Mass-casualty simulation engine
///
/// # Determinism
///
/// All randomness goes through one seeded [`RngManager`] that never leaves
/// the engine. Same config + same operations = same state.
pub struct Engine {
    run_id: Uuid,
    config: EngineConfig,
    config_hash: String,
    clock: SimClock,
    rng: RngManager,

    /// Roster in arrival order
    patients: Vec<Patient>,
    index: BTreeMap<String, usize>,

    resources: ResourceManager,
    policy: Box<dyn AllocationPolicy>,
    scenario: ScenarioEventHandler,
    pending_inquiry: Option<PendingInquiry>,
    inquiries_raised: usize,

    metrics: Metrics,
    event_log: EventLog,
    observers: Vec<Box<dyn EventObserver>>,
    history: Vec<Operation>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("run_id", &self.run_id)
            .field("hour", &self.clock.current_hour())
            .field("patients", &self.patients.len())
            .field("policy", &self.policy.name())
            .field("events", &self.event_log.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine and generate its roster from `config.seed`
    ///
    /// Patients arriving at hour 0 are admitted immediately.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = RngManager::new(config.seed);
        let roster = PopulationGenerator::new(config.population.clone(), config.duration_hours)
            .generate(&mut rng);
        Self::build(config, rng, roster)
    }

    /// Create an engine with a hand-built roster instead of a generated one
    ///
    /// Patients are ordered by arrival hour (stable). Ids must be unique.
    pub fn with_roster(
        config: EngineConfig,
        mut patients: Vec<Patient>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        patients.sort_by_key(Patient::arrival_hour);
        let rng = RngManager::new(config.seed);
        Self::build(config, rng, patients)
    }

    /// Rebuild an engine by applying `operations` to a fresh run
    ///
    /// Failed operations are replayed too; they leave state unchanged, so the
    /// result matches the original engine whenever the history is complete.
    pub fn replay(config: EngineConfig, operations: &[Operation]) -> Result<Self, ConfigError> {
        let mut engine = Self::new(config)?;
        for op in operations {
            // Failures are part of the recorded history
            let _ = engine.apply(op.clone());
        }
        Ok(engine)
    }

    fn build(
        config: EngineConfig,
        rng: RngManager,
        patients: Vec<Patient>,
    ) -> Result<Self, ConfigError> {
        let mut index = BTreeMap::new();
        for (i, p) in patients.iter().enumerate() {
            if index.insert(p.id().to_string(), i).is_some() {
                return Err(ConfigError::Invalid(format!("duplicate patient id: {}", p.id())));
            }
        }

        let resources = ResourceManager::builder()
            .beds(config.beds)
            .surgeons(config.surgeons)
            .nurses(config.nurses)
            .operating_rooms(config.operating_rooms)
            .blood_supply(config.blood_supply.clone())
            .fatigue_model(config.fatigue.clone())
            .build();

        let mut engine = Self {
            run_id: Uuid::new_v4(),
            config_hash: config.config_hash()?,
            clock: SimClock::new(config.duration_hours),
            rng,
            patients,
            index,
            resources,
            policy: config.policy.build(),
            scenario: ScenarioEventHandler::new(config.scenario_events.clone()),
            pending_inquiry: None,
            inquiries_raised: 0,
            metrics: Metrics::default(),
            event_log: EventLog::new(),
            observers: Vec::new(),
            history: Vec::new(),
            config,
        };

        info!(
            run_id = %engine.run_id,
            seed = engine.config.seed,
            patients = engine.patients.len(),
            policy = engine.policy.name(),
            "engine created"
        );

        let mut events = Vec::new();
        engine.admit_arrivals(0, &mut events);
        engine.surface_scenario_events(0, &mut events);
        engine.metrics = engine.compute_metrics();
        Ok(engine)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn current_hour(&self) -> usize {
        self.clock.current_hour()
    }

    pub fn is_complete(&self) -> bool {
        self.clock.is_complete()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Full roster in arrival order, including patients not yet arrived
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn patient(&self, patient_id: &str) -> Option<&Patient> {
        self.index.get(patient_id).map(|&i| &self.patients[i])
    }

    /// Admitted Waiting patients, most critical first, then by arrival
    pub fn waiting_queue(&self) -> Vec<&Patient> {
        let mut queue: Vec<&Patient> = self.patients.iter().filter(|p| p.is_waiting()).collect();
        queue.sort_by_key(|p| p.triage_score());
        queue
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Metrics as of the end of the last tick
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn pending_inquiry(&self) -> Option<&PendingInquiry> {
        self.pending_inquiry.as_ref()
    }

    /// Every operation applied so far, successful or not
    pub fn history(&self) -> &[Operation] {
        &self.history
    }

    pub fn deaths(&self) -> usize {
        self.count_status(PatientStatus::Deceased)
    }

    /// Register an observer for every event emitted from now on
    pub fn add_observer(&mut self, observer: Box<dyn EventObserver>) {
        self.observers.push(observer);
    }

    /// Read-only snapshot of the whole engine
    pub fn get_state(&self) -> StateSnapshot {
        StateSnapshot {
            run_id: self.run_id,
            config_hash: self.config_hash.clone(),
            current_hour: self.clock.current_hour(),
            duration_hours: self.clock.duration_hours(),
            complete: self.clock.is_complete(),
            rng_state: self.rng.get_state(),
            counts: PatientCounts::tally(&self.patients),
            waiting_queue: self
                .waiting_queue()
                .iter()
                .map(|p| p.id().to_string())
                .collect(),
            patients: self.patients.iter().map(PatientSummary::from).collect(),
            staff: self.resources.all_staff().to_vec(),
            operating_rooms: self.resources.operating_rooms().to_vec(),
            resources: self.resources.summary(),
            metrics: self.compute_metrics(),
            pending_inquiry: self.pending_inquiry.as_ref().map(|q| q.inquiry_id.clone()),
            event_count: self.event_log.len(),
        }
    }

    // ========================================================================
    // Operation Dispatch
    // ========================================================================

    /// Apply one operation and record it in the history
    pub fn apply(&mut self, op: Operation) -> Result<Outcome, OperationError> {
        self.history.push(op.clone());
        let action = op.name();
        let result = match op {
            Operation::AdvanceHour => self.tick().map(Outcome::Tick),
            Operation::AssignBed { patient_id } => {
                self.exec_assign_bed(&patient_id).map(Outcome::Operation)
            }
            Operation::ScheduleSurgery {
                patient_id,
                surgeon_id,
                room_id,
            } => self
                .exec_schedule_surgery(&patient_id, surgeon_id.as_deref(), room_id.as_deref())
                .map(Outcome::Operation),
            Operation::DischargePatient { patient_id } => {
                self.exec_discharge(&patient_id).map(Outcome::Operation)
            }
            Operation::AdministerBlood { patient_id, units } => self
                .exec_administer_blood(&patient_id, units)
                .map(Outcome::Operation),
            Operation::SetTriage { patient_id, triage } => {
                self.exec_set_triage(&patient_id, triage).map(Outcome::Operation)
            }
            Operation::SetStaffRest { staff_id, hours } => {
                self.exec_set_staff_rest(&staff_id, hours).map(Outcome::Operation)
            }
            Operation::UpdateFamily { patient_id } => {
                self.exec_update_family(&patient_id).map(Outcome::Operation)
            }
            Operation::RespondToMedia { reported_deaths } => self
                .exec_respond_to_media(reported_deaths)
                .map(Outcome::Operation),
        };
        Self::trace_failure(action, self.clock.current_hour(), result)
    }

    /// Run one hour of the simulation
    ///
    /// # Errors
    ///
    /// `Validation(SimulationComplete)` once the final hour has run.
    pub fn advance_hour(&mut self) -> Result<TickReport, OperationError> {
        self.history.push(Operation::AdvanceHour);
        Self::trace_failure("advance_hour", self.clock.current_hour(), self.tick())
    }

    /// Give a waiting patient the lowest-numbered free bed, and a nurse if
    /// one is free
    pub fn assign_bed(&mut self, patient_id: &str) -> Result<OperationReport, OperationError> {
        self.record_and_run(
            Operation::AssignBed {
                patient_id: patient_id.to_string(),
            },
            |e| e.exec_assign_bed(patient_id),
        )
    }

    /// Start surgery for a bedded patient. Surgeon and room are chosen
    /// automatically when not given.
    pub fn schedule_surgery(
        &mut self,
        patient_id: &str,
        surgeon_id: Option<&str>,
        room_id: Option<&str>,
    ) -> Result<OperationReport, OperationError> {
        self.record_and_run(
            Operation::ScheduleSurgery {
                patient_id: patient_id.to_string(),
                surgeon_id: surgeon_id.map(str::to_string),
                room_id: room_id.map(str::to_string),
            },
            |e| e.exec_schedule_surgery(patient_id, surgeon_id, room_id),
        )
    }

    pub fn discharge_patient(
        &mut self,
        patient_id: &str,
    ) -> Result<OperationReport, OperationError> {
        self.record_and_run(
            Operation::DischargePatient {
                patient_id: patient_id.to_string(),
            },
            |e| e.exec_discharge(patient_id),
        )
    }

    pub fn administer_blood(
        &mut self,
        patient_id: &str,
        units: u32,
    ) -> Result<OperationReport, OperationError> {
        self.record_and_run(
            Operation::AdministerBlood {
                patient_id: patient_id.to_string(),
                units,
            },
            |e| e.exec_administer_blood(patient_id, units),
        )
    }

    pub fn set_triage(
        &mut self,
        patient_id: &str,
        triage: u8,
    ) -> Result<OperationReport, OperationError> {
        self.record_and_run(
            Operation::SetTriage {
                patient_id: patient_id.to_string(),
                triage,
            },
            |e| e.exec_set_triage(patient_id, triage),
        )
    }

    pub fn set_staff_rest(
        &mut self,
        staff_id: &str,
        hours: u32,
    ) -> Result<OperationReport, OperationError> {
        self.record_and_run(
            Operation::SetStaffRest {
                staff_id: staff_id.to_string(),
                hours,
            },
            |e| e.exec_set_staff_rest(staff_id, hours),
        )
    }

    pub fn update_family(&mut self, patient_id: &str) -> Result<OperationReport, OperationError> {
        self.record_and_run(
            Operation::UpdateFamily {
                patient_id: patient_id.to_string(),
            },
            |e| e.exec_update_family(patient_id),
        )
    }

    /// Answer the pending media inquiry with a death count
    pub fn respond_to_media(
        &mut self,
        reported_deaths: u32,
    ) -> Result<OperationReport, OperationError> {
        self.record_and_run(Operation::RespondToMedia { reported_deaths }, |e| {
            e.exec_respond_to_media(reported_deaths)
        })
    }

    fn record_and_run<F>(
        &mut self,
        op: Operation,
        run: F,
    ) -> Result<OperationReport, OperationError>
    where
        F: FnOnce(&mut Self) -> Result<OperationReport, OperationError>,
    {
        let action = op.name();
        self.history.push(op);
        let result = run(self);
        Self::trace_failure(action, self.clock.current_hour(), result)
    }

    fn trace_failure<T>(
        action: &'static str,
        hour: usize,
        result: Result<T, OperationError>,
    ) -> Result<T, OperationError> {
        match &result {
            Err(OperationError::Blocked { rule, detail }) => {
                warn!(hour, action, %rule, detail = %detail, "operation blocked by policy")
            }
            Err(OperationError::Declined(reason)) => {
                info!(hour, action, reason = %reason, "operation declined")
            }
            Err(OperationError::Validation(err)) => {
                debug!(hour, action, error = %err, "operation rejected")
            }
            Ok(_) => debug!(hour, action, "operation applied"),
        }
        result
    }

    // ========================================================================
    // Event Emission
    // ========================================================================

    /// Log an event, notify observers and append it to the caller's report
    fn emit(&mut self, events: &mut Vec<Event>, event: Event) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
        self.event_log.log(event.clone());
        events.push(event);
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    fn tick(&mut self) -> Result<TickReport, OperationError> {
        if self.clock.is_complete() {
            return Err(ValidationError::SimulationComplete.into());
        }

        let hour = self.clock.advance_hour();
        let mut events = Vec::new();
        debug!(hour, "tick start");

        // STEP 1: ARRIVALS
        let arrivals = self.admit_arrivals(hour, &mut events);

        // STEP 2: DETERIORATION
        self.deteriorate_waiting(hour, &mut events);

        // STEP 3: BEDS AND SURGERY
        self.advance_treatment(hour, &mut events);

        // STEP 4: STAFF FATIGUE
        self.advance_staff(hour, &mut events);

        // STEP 5: MEDIA
        self.surface_scenario_events(hour, &mut events);

        // STEP 6: FAMILIES
        self.advance_families(hour, &mut events);

        // STEP 7: DEATHS
        let deaths = self.check_deaths(hour, &mut events);

        // STEP 8: METRICS
        self.metrics = self.compute_metrics();

        info!(
            hour,
            arrivals,
            deaths,
            waiting = self.count_waiting(),
            discharged = self.metrics.discharged,
            events = events.len(),
            "tick complete"
        );

        Ok(TickReport {
            hour,
            events,
            arrivals,
            deaths,
            metrics: self.metrics.clone(),
            complete: self.clock.is_complete(),
        })
    }

    fn admit_arrivals(&mut self, hour: usize, events: &mut Vec<Event>) -> usize {
        let mut admitted = 0;
        for i in 0..self.patients.len() {
            let p = &mut self.patients[i];
            if p.is_admitted() || p.arrival_hour() > hour {
                continue;
            }
            p.admit(hour);
            let event = Event::PatientArrived {
                hour,
                patient_id: p.id().to_string(),
                triage: p.triage_score(),
            };
            self.emit(events, event);
            admitted += 1;
        }
        admitted
    }

    fn deteriorate_waiting(&mut self, hour: usize, events: &mut Vec<Event>) {
        for i in 0..self.patients.len() {
            let p = &mut self.patients[i];
            if !p.is_waiting() || p.admitted_hour() == Some(hour) {
                continue;
            }
            if let Some((old_triage, new_triage)) = p.wait_one_hour() {
                let event = Event::TriageDeteriorated {
                    hour,
                    patient_id: p.id().to_string(),
                    old_triage,
                    new_triage,
                };
                self.emit(events, event);
            }
        }
    }

    fn advance_treatment(&mut self, hour: usize, events: &mut Vec<Event>) {
        let bed_treatment_hours = self.config.clinical.bed_treatment_hours;

        for i in 0..self.patients.len() {
            let p = &mut self.patients[i];
            if !p.status().holds_bed() {
                continue;
            }
            p.bed_one_hour();

            let treated = p.status() == PatientStatus::AssignedBed
                && !p.needs_surgery()
                && p.hours_in_bed() >= bed_treatment_hours;
            if !treated {
                continue;
            }
            p.begin_recovery();
            let event = Event::TreatmentCompleted {
                hour,
                patient_id: p.id().to_string(),
                bed_id: p.bed_id().unwrap_or_default().to_string(),
            };
            self.emit(events, event);
        }

        for done in self.resources.check_completed_surgeries(hour) {
            if let Some(&i) = self.index.get(&done.patient_id) {
                self.patients[i].begin_recovery();
            }
            self.emit(
                events,
                Event::SurgeryCompleted {
                    hour,
                    patient_id: done.patient_id,
                    room_id: done.room_id,
                    surgeon_id: done.surgeon_id,
                },
            );
        }
    }

    fn advance_staff(&mut self, hour: usize, events: &mut Vec<Event>) {
        let report = self.resources.advance_fatigue(&mut self.rng);

        for incident in report.incidents {
            warn!(
                hour,
                staff_id = %incident.staff_id,
                patient_id = %incident.patient_id,
                fatigue = incident.fatigue,
                "fatigue error"
            );
            self.emit(
                events,
                Event::FatigueError {
                    hour,
                    staff_id: incident.staff_id,
                    patient_id: incident.patient_id,
                    fatigue: incident.fatigue,
                },
            );
        }

        for (staff_id, fatigue) in report.rest_completed {
            self.emit(
                events,
                Event::StaffRestCompleted {
                    hour,
                    staff_id,
                    fatigue,
                },
            );
        }
    }

    fn surface_scenario_events(&mut self, hour: usize, events: &mut Vec<Event>) {
        let due: Vec<ScenarioEvent> = self
            .scenario
            .events_for_hour(hour)
            .into_iter()
            .cloned()
            .collect();

        for scenario_event in due {
            match scenario_event {
                ScenarioEvent::MediaInquiry { topic } => {
                    self.inquiries_raised += 1;
                    let inquiry_id = format!("MQ{:02}", self.inquiries_raised);
                    info!(hour, inquiry_id = %inquiry_id, topic = %topic, "media inquiry");
                    self.pending_inquiry = Some(PendingInquiry {
                        inquiry_id: inquiry_id.clone(),
                        topic: topic.clone(),
                        hour,
                    });
                    self.emit(
                        events,
                        Event::MediaInquiry {
                            hour,
                            inquiry_id,
                            topic,
                        },
                    );
                }
            }
        }
    }

    fn advance_families(&mut self, hour: usize, events: &mut Vec<Event>) {
        let rules = &self.config.clinical;
        let (threshold, growth, distress) = (
            rules.family_update_threshold_hours,
            rules.family_anxiety_growth,
            rules.family_distress_threshold,
        );

        for i in 0..self.patients.len() {
            let p = &mut self.patients[i];
            if !p.is_admitted() || p.status().is_terminal() {
                continue;
            }
            let Some((old, new)) = p.family_one_hour(threshold, growth) else {
                continue;
            };
            if old < distress && new >= distress {
                let event = Event::FamilyDistressed {
                    hour,
                    patient_id: p.id().to_string(),
                    anxiety: new,
                };
                self.emit(events, event);
            }
        }
    }

    /// Roll deaths over the waiting queue in arrival order
    ///
    /// A triage-1 patient past the critical wait rolls first; if they
    /// survive, the prolonged-wait roll is independent.
    fn check_deaths(&mut self, hour: usize, events: &mut Vec<Event>) -> usize {
        let rules = self.config.clinical.clone();
        let mut deaths = 0;

        for i in 0..self.patients.len() {
            if !self.patients[i].is_waiting() {
                continue;
            }
            let (triage, waited) = (
                self.patients[i].triage_score(),
                self.patients[i].hours_waiting(),
            );

            let mut dies = false;
            if triage == TRIAGE_MIN && waited >= rules.critical_death_wait_hours {
                dies = self.rng.chance(rules.critical_death_probability);
            }
            if !dies
                && triage <= rules.prolonged_death_max_triage
                && waited >= rules.prolonged_death_wait_hours
            {
                dies = self.rng.chance(rules.prolonged_death_probability);
            }
            if !dies {
                continue;
            }

            let p = &mut self.patients[i];
            p.die(hour);
            deaths += 1;
            info!(
                hour,
                patient_id = %p.id(),
                triage,
                hours_waiting = waited,
                "patient died waiting"
            );
            let event = Event::PatientDied {
                hour,
                patient_id: p.id().to_string(),
                triage,
                hours_waiting: waited,
                social_status: p.social_status(),
            };
            self.emit(events, event);
        }
        deaths
    }

    fn compute_metrics(&self) -> Metrics {
        let hour = self.clock.current_hour();
        let admitted = self.patients.iter().filter(|p| p.is_admitted()).count();
        let discharged = self.count_status(PatientStatus::Discharged);
        let beds_total = self.resources.bed_count();
        let beds_occupied = beds_total - self.resources.available_beds().len();

        Metrics {
            hour,
            admitted,
            discharged,
            deaths: self.count_status(PatientStatus::Deceased),
            readmissions: self.patients.iter().map(Patient::readmissions).sum(),
            premature_discharges: self.patients.iter().map(Patient::premature_discharges).sum(),
            triage_skips: self.event_log.count_of_type("TriageSkip"),
            fatigue_errors: self.event_log.count_of_type("FatigueError"),
            throughput: ratio(discharged, hour),
            efficiency: ratio(discharged, admitted),
            bed_utilization: ratio(beds_occupied, beds_total),
        }
    }

    fn count_status(&self, status: PatientStatus) -> usize {
        self.patients.iter().filter(|p| p.status() == status).count()
    }

    fn count_waiting(&self) -> usize {
        self.patients.iter().filter(|p| p.is_waiting()).count()
    }

    // ========================================================================
    // Shared Checks
    // ========================================================================

    /// Index of an admitted patient
    fn admitted_index(&self, patient_id: &str) -> Result<usize, ValidationError> {
        let &i = self
            .index
            .get(patient_id)
            .ok_or_else(|| ValidationError::UnknownPatient(patient_id.to_string()))?;
        if !self.patients[i].is_admitted() {
            return Err(ValidationError::NotYetArrived(patient_id.to_string()));
        }
        Ok(i)
    }

    fn require_status(
        &self,
        i: usize,
        allowed: &[PatientStatus],
        operation: &'static str,
    ) -> Result<(), ValidationError> {
        let p = &self.patients[i];
        if allowed.contains(&p.status()) {
            return Ok(());
        }
        Err(ValidationError::InvalidState {
            patient_id: p.id().to_string(),
            status: p.status(),
            operation,
        })
    }

    /// Triage-order check for giving patient `i` a resource
    ///
    /// Returns the skipped patient when the policy only records the skip.
    fn check_triage_order(&self, i: usize) -> Result<Option<Skip>, OperationError> {
        let candidate = &self.patients[i];
        let Some(skipped) = find_skipped_patient(&self.patients, candidate) else {
            return Ok(None);
        };

        match self.policy.enforcement(PolicyRule::TriageOrder) {
            Enforcement::Block => Err(OperationError::Blocked {
                rule: PolicyRule::TriageOrder,
                detail: format!(
                    "{} (triage {}) would go ahead of {} (triage {})",
                    candidate.id(),
                    candidate.triage_score(),
                    skipped.id(),
                    skipped.triage_score()
                ),
            }),
            Enforcement::Record => Ok(Some(Skip {
                skipped_id: skipped.id().to_string(),
                skipped_triage: skipped.triage_score(),
            })),
        }
    }

    fn emit_skip(
        &mut self,
        events: &mut Vec<Event>,
        operation: &str,
        i: usize,
        skip: Option<Skip>,
    ) {
        let Some(skip) = skip else {
            return;
        };
        let hour = self.clock.current_hour();
        let (patient_id, patient_triage, is_vip) = {
            let p = &self.patients[i];
            (p.id().to_string(), p.triage_score(), p.is_vip())
        };

        self.emit(
            events,
            Event::TriageSkip {
                hour,
                operation: operation.to_string(),
                patient_id: patient_id.clone(),
                patient_triage,
                skipped_patient_id: skip.skipped_id.clone(),
                skipped_triage: skip.skipped_triage,
            },
        );
        if is_vip {
            self.emit(
                events,
                Event::VipFastTrack {
                    hour,
                    patient_id,
                    skipped_patient_id: skip.skipped_id,
                },
            );
        }
    }

    fn is_overtime(&self, staff_id: &str) -> bool {
        let limit = self.config.clinical.max_continuous_hours;
        self.resources
            .staff(staff_id)
            .is_some_and(|s| s.hours_worked_continuous() >= limit)
    }

    /// Record an assignment of a staff member past the continuous-hours limit
    fn emit_overtime(&mut self, events: &mut Vec<Event>, staff_id: &str, patient_id: &str) {
        if !self.is_overtime(staff_id) {
            return;
        }
        let hour = self.clock.current_hour();
        let hours_worked_continuous = self
            .resources
            .staff(staff_id)
            .map_or(0, |s| s.hours_worked_continuous());
        warn!(hour, staff_id, hours_worked_continuous, "overtime assignment");
        self.emit(
            events,
            Event::OvertimeAssignment {
                hour,
                staff_id: staff_id.to_string(),
                patient_id: patient_id.to_string(),
                hours_worked_continuous,
            },
        );
    }

    // ========================================================================
    // Operations
    // ========================================================================

    fn exec_assign_bed(&mut self, patient_id: &str) -> Result<OperationReport, OperationError> {
        let i = self.admitted_index(patient_id)?;
        self.require_status(i, &[PatientStatus::Waiting], "assign a bed to")?;

        let skip = self.check_triage_order(i)?;

        let bed_id = self
            .resources
            .available_beds()
            .first()
            .map(|b| b.to_string())
            .ok_or(DeclineReason::NoBedAvailable)?;
        if !self.resources.assign_bed(&bed_id, patient_id) {
            return Err(DeclineReason::NoBedAvailable.into());
        }

        // Strict rest rules leave the bed unstaffed rather than use a nurse on overtime
        let rest_rule = self.policy.enforcement(PolicyRule::MandatoryRest);
        let free_nurse = self
            .resources
            .available_nurses()
            .iter()
            .map(|n| n.id().to_string())
            .find(|nid| rest_rule == Enforcement::Record || !self.is_overtime(nid));
        let nurse_id = free_nurse.filter(|n| self.resources.assign_staff(n, patient_id).is_ok());
        self.patients[i].assign_bed(bed_id.clone(), nurse_id.clone());

        let hour = self.clock.current_hour();
        let mut events = Vec::new();
        self.emit_skip(&mut events, "assign_bed", i, skip);
        if let Some(nid) = nurse_id.as_deref() {
            self.emit_overtime(&mut events, nid, patient_id);
        }
        self.emit(
            &mut events,
            Event::BedAssigned {
                hour,
                patient_id: patient_id.to_string(),
                bed_id,
                nurse_id,
            },
        );
        Ok(OperationReport { hour, events })
    }

    fn exec_schedule_surgery(
        &mut self,
        patient_id: &str,
        surgeon_id: Option<&str>,
        room_id: Option<&str>,
    ) -> Result<OperationReport, OperationError> {
        let i = self.admitted_index(patient_id)?;
        self.require_status(i, &[PatientStatus::AssignedBed], "schedule surgery for")?;
        if !self.patients[i].needs_surgery() {
            return Err(ValidationError::NoSurgeryNeeded(patient_id.to_string()).into());
        }
        if let Some(sid) = surgeon_id {
            let staff = self
                .resources
                .staff(sid)
                .ok_or_else(|| ValidationError::UnknownStaff(sid.to_string()))?;
            if staff.role() != StaffRole::Surgeon {
                return Err(ValidationError::NotASurgeon(sid.to_string()).into());
            }
        }
        if let Some(rid) = room_id {
            if self.resources.operating_room(rid).is_none() {
                return Err(ValidationError::UnknownRoom(rid.to_string()).into());
            }
        }

        let skip = self.check_triage_order(i)?;
        let rest_rule = self.policy.enforcement(PolicyRule::MandatoryRest);

        let room = match room_id {
            Some(rid) => {
                let busy = self.resources.operating_room(rid).is_some_and(|r| r.in_use());
                if busy {
                    return Err(DeclineReason::RoomBusy(rid.to_string()).into());
                }
                rid.to_string()
            }
            None => self
                .resources
                .available_rooms()
                .first()
                .map(|r| r.id().to_string())
                .ok_or(DeclineReason::NoRoomAvailable)?,
        };

        let surgeon = match surgeon_id {
            Some(sid) => {
                let available = self.resources.staff(sid).is_some_and(|s| s.is_available());
                if !available {
                    return Err(DeclineReason::SurgeonUnavailable(sid.to_string()).into());
                }
                if rest_rule == Enforcement::Block && self.is_overtime(sid) {
                    return Err(OperationError::Blocked {
                        rule: PolicyRule::MandatoryRest,
                        detail: format!(
                            "{} has worked {} continuous hours",
                            sid,
                            self.resources
                                .staff(sid)
                                .map_or(0, |s| s.hours_worked_continuous())
                        ),
                    });
                }
                sid.to_string()
            }
            None => self
                .resources
                .available_surgeons()
                .iter()
                .map(|s| s.id().to_string())
                .find(|sid| rest_rule == Enforcement::Record || !self.is_overtime(sid))
                .ok_or(DeclineReason::NoSurgeonAvailable)?,
        };

        let duration = self
            .config
            .clinical
            .surgery_hours(self.patients[i].triage_score());
        let hour = self.clock.current_hour();
        let end_hour = self
            .resources
            .start_surgery(&room, patient_id, &surgeon, hour, duration)
            .map_err(decline_from_resource)?;
        self.patients[i].start_surgery();

        let mut events = Vec::new();
        self.emit_skip(&mut events, "schedule_surgery", i, skip);
        self.emit_overtime(&mut events, &surgeon, patient_id);
        if self.patients[i].has_dnr() {
            self.emit(
                &mut events,
                Event::DnrOverridden {
                    hour,
                    patient_id: patient_id.to_string(),
                },
            );
        }
        self.emit(
            &mut events,
            Event::SurgeryStarted {
                hour,
                patient_id: patient_id.to_string(),
                room_id: room,
                surgeon_id: surgeon,
                end_hour,
            },
        );
        Ok(OperationReport { hour, events })
    }

    /// Discharge, flagging it premature when the patient has not recovered
    ///
    /// A premature discharge rolls for readmission; a readmitted patient
    /// goes back to Waiting one triage level worse.
    fn exec_discharge(&mut self, patient_id: &str) -> Result<OperationReport, OperationError> {
        let i = self.admitted_index(patient_id)?;
        self.require_status(
            i,
            &[PatientStatus::AssignedBed, PatientStatus::Recovering],
            "discharge",
        )?;

        let hour = self.clock.current_hour();
        let min_bed_hours = self.config.clinical.min_bed_hours;
        let readmission_probability = self.config.clinical.readmission_probability;

        let prior_status = self.patients[i].status();
        let hours_in_bed = self.patients[i].hours_in_bed();
        let premature = prior_status == PatientStatus::AssignedBed
            || (prior_status == PatientStatus::Recovering && hours_in_bed < min_bed_hours);

        let (bed_id, _) = self.patients[i].release_bed();
        if let Some(bed) = bed_id {
            self.resources.free_bed(&bed);
        }
        self.resources.release_patient_staff(patient_id);

        let mut events = Vec::new();
        if !premature {
            self.patients[i].discharge(hour);
            self.emit(
                &mut events,
                Event::PatientDischarged {
                    hour,
                    patient_id: patient_id.to_string(),
                    premature: false,
                },
            );
            return Ok(OperationReport { hour, events });
        }

        self.patients[i].record_premature_discharge();
        self.emit(
            &mut events,
            Event::PrematureDischarge {
                hour,
                patient_id: patient_id.to_string(),
                prior_status,
                hours_in_bed,
            },
        );

        if self.rng.chance(readmission_probability) {
            let old_triage = self.patients[i].triage_score();
            self.patients[i].readmit();
            let new_triage = self.patients[i].triage_score();
            info!(hour, patient_id, old_triage, new_triage, "patient readmitted");
            self.emit(
                &mut events,
                Event::PatientReadmitted {
                    hour,
                    patient_id: patient_id.to_string(),
                    old_triage,
                    new_triage,
                },
            );
        } else {
            self.patients[i].discharge(hour);
            self.emit(
                &mut events,
                Event::PatientDischarged {
                    hour,
                    patient_id: patient_id.to_string(),
                    premature: true,
                },
            );
        }
        Ok(OperationReport { hour, events })
    }

    fn exec_administer_blood(
        &mut self,
        patient_id: &str,
        units: u32,
    ) -> Result<OperationReport, OperationError> {
        let max = self.config.clinical.max_blood_units_per_request;
        if units == 0 || units > max {
            return Err(ValidationError::InvalidBloodUnits { units, max }.into());
        }
        let i = self.admitted_index(patient_id)?;
        self.require_status(
            i,
            &[
                PatientStatus::Waiting,
                PatientStatus::AssignedBed,
                PatientStatus::InSurgery,
                PatientStatus::Recovering,
            ],
            "transfuse",
        )?;

        let skip = self.check_triage_order(i)?;

        let recipient = self.patients[i].blood_type();
        let draws = self
            .resources
            .use_blood(recipient, units)
            .map_err(decline_from_resource)?;

        let clinically_indicated = self.patients[i].needs_blood();
        self.patients[i].receive_blood(units);

        let hour = self.clock.current_hour();
        let mut events = Vec::new();
        self.emit_skip(&mut events, "administer_blood", i, skip);
        if !clinically_indicated {
            debug!(hour, patient_id, units, "transfusion without clinical need");
        }
        self.emit(
            &mut events,
            Event::BloodAdministered {
                hour,
                patient_id: patient_id.to_string(),
                units,
                draws,
                clinically_indicated,
            },
        );
        Ok(OperationReport { hour, events })
    }

    fn exec_set_triage(
        &mut self,
        patient_id: &str,
        triage: u8,
    ) -> Result<OperationReport, OperationError> {
        if !(TRIAGE_MIN..=TRIAGE_MAX).contains(&triage) {
            return Err(ValidationError::TriageOutOfRange(triage).into());
        }
        let i = self.admitted_index(patient_id)?;
        if self.patients[i].status().is_terminal() {
            return Err(ValidationError::InvalidState {
                patient_id: patient_id.to_string(),
                status: self.patients[i].status(),
                operation: "re-triage",
            }
            .into());
        }

        let p = &mut self.patients[i];
        let old_triage = p.triage_score();
        p.set_triage(triage);
        let event = Event::TriageOverridden {
            hour: self.clock.current_hour(),
            patient_id: patient_id.to_string(),
            old_triage,
            new_triage: p.triage_score(),
            original_triage: p.original_triage(),
        };

        let mut events = Vec::new();
        self.emit(&mut events, event);
        Ok(OperationReport {
            hour: self.clock.current_hour(),
            events,
        })
    }

    /// Send a staff member to rest for `hours`
    ///
    /// A nurse's patient keeps their bed but loses the nurse. A surgeon who
    /// is operating cannot be sent to rest.
    fn exec_set_staff_rest(
        &mut self,
        staff_id: &str,
        hours: u32,
    ) -> Result<OperationReport, OperationError> {
        let max = self.config.clinical.max_rest_hours;
        if hours == 0 || hours > max {
            return Err(ValidationError::InvalidRestHours { hours, max }.into());
        }
        let staff = self
            .resources
            .staff(staff_id)
            .ok_or_else(|| ValidationError::UnknownStaff(staff_id.to_string()))?;
        if staff.is_resting() {
            return Err(ValidationError::AlreadyResting(staff_id.to_string()).into());
        }
        let operating = self
            .resources
            .operating_rooms()
            .iter()
            .any(|r| r.surgeon_id() == Some(staff_id));
        if operating {
            return Err(DeclineReason::SurgeonInSurgery(staff_id.to_string()).into());
        }
        let released = staff.current_patient().map(str::to_string);

        self.resources
            .send_to_rest(staff_id, hours)
            .map_err(|e| match e {
                ResourceError::AlreadyResting(id) => ValidationError::AlreadyResting(id).into(),
                other => decline_from_resource(other),
            })?;
        if let Some(pid) = released {
            if let Some(&pi) = self.index.get(&pid) {
                if self.patients[pi].nurse_id() == Some(staff_id) {
                    self.patients[pi].clear_nurse();
                }
            }
        }

        let hour = self.clock.current_hour();
        let fatigue = self.resources.staff(staff_id).map_or(0.0, |s| s.fatigue());
        let mut events = Vec::new();
        self.emit(
            &mut events,
            Event::StaffRested {
                hour,
                staff_id: staff_id.to_string(),
                hours,
                fatigue,
            },
        );
        Ok(OperationReport { hour, events })
    }

    fn exec_update_family(&mut self, patient_id: &str) -> Result<OperationReport, OperationError> {
        let i = self.admitted_index(patient_id)?;
        if !self.patients[i].family_present() {
            return Err(ValidationError::NoFamilyPresent(patient_id.to_string()).into());
        }

        let relief = self.config.clinical.family_update_relief;
        let (anxiety_before, anxiety_after) = self.patients[i].update_family(relief);

        let hour = self.clock.current_hour();
        let mut events = Vec::new();
        self.emit(
            &mut events,
            Event::FamilyUpdated {
                hour,
                patient_id: patient_id.to_string(),
                anxiety_before,
                anxiety_after,
            },
        );
        Ok(OperationReport { hour, events })
    }

    fn exec_respond_to_media(
        &mut self,
        reported_deaths: u32,
    ) -> Result<OperationReport, OperationError> {
        let inquiry = self
            .pending_inquiry
            .take()
            .ok_or(ValidationError::NoPendingInquiry)?;

        let hour = self.clock.current_hour();
        let actual_deaths = self.deaths() as u32;
        let mut events = Vec::new();
        self.emit(
            &mut events,
            Event::MediaResponse {
                hour,
                inquiry_id: inquiry.inquiry_id.clone(),
                reported_deaths,
                actual_deaths,
            },
        );
        if reported_deaths < actual_deaths {
            warn!(hour, reported_deaths, actual_deaths, "deaths under-reported to press");
            self.emit(
                &mut events,
                Event::MortalitySuppression {
                    hour,
                    inquiry_id: inquiry.inquiry_id,
                    reported_deaths,
                    actual_deaths,
                },
            );
        }
        Ok(OperationReport { hour, events })
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Map a resource primitive failure onto the operation taxonomy
fn decline_from_resource(err: ResourceError) -> OperationError {
    match err {
        ResourceError::InsufficientBlood {
            recipient,
            requested,
            available,
        } => DeclineReason::InsufficientBlood {
            recipient,
            requested,
            available,
        }
        .into(),
        ResourceError::RoomBusy(id) => DeclineReason::RoomBusy(id).into(),
        ResourceError::StaffUnavailable(id) => DeclineReason::SurgeonUnavailable(id).into(),
        ResourceError::UnknownStaff(id) => ValidationError::UnknownStaff(id).into(),
        ResourceError::UnknownRoom(id) => ValidationError::UnknownRoom(id).into(),
        ResourceError::NotASurgeon(id) => ValidationError::NotASurgeon(id).into(),
        ResourceError::AlreadyResting(id) => ValidationError::AlreadyResting(id).into(),
        other => ValidationError::Resource(other).into(),
    }
}
