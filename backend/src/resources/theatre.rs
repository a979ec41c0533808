//! Operating room scheduling
//!
//! A room holds at most one patient and one surgeon. Starting a surgery marks
//! both the room and the surgeon busy until `surgery_end_hour`;
//! [`ResourceManager::check_completed_surgeries`] releases both once that hour
//! is reached.

use crate::models::staff::StaffRole;
use crate::resources::{ResourceError, ResourceManager};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingRoom {
    id: String,
    in_use: bool,
    patient_id: Option<String>,
    surgeon_id: Option<String>,
    surgery_start_hour: Option<usize>,
    surgery_end_hour: Option<usize>,
}

impl OperatingRoom {
    pub fn new(id: String) -> Self {
        Self {
            id,
            in_use: false,
            patient_id: None,
            surgeon_id: None,
            surgery_start_hour: None,
            surgery_end_hour: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn in_use(&self) -> bool {
        self.in_use
    }

    pub fn patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn surgeon_id(&self) -> Option<&str> {
        self.surgeon_id.as_deref()
    }

    pub fn surgery_start_hour(&self) -> Option<usize> {
        self.surgery_start_hour
    }

    pub fn surgery_end_hour(&self) -> Option<usize> {
        self.surgery_end_hour
    }

    fn clear(&mut self) -> (Option<String>, Option<String>) {
        self.in_use = false;
        self.surgery_start_hour = None;
        self.surgery_end_hour = None;
        (self.patient_id.take(), self.surgeon_id.take())
    }
}

/// A surgery released by [`ResourceManager::check_completed_surgeries`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSurgery {
    pub room_id: String,
    pub patient_id: String,
    pub surgeon_id: String,
}

impl ResourceManager {
    pub fn operating_rooms(&self) -> &[OperatingRoom] {
        &self.rooms
    }

    pub fn operating_room(&self, room_id: &str) -> Option<&OperatingRoom> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    /// Idle rooms in configuration order
    pub fn available_rooms(&self) -> Vec<&OperatingRoom> {
        self.rooms.iter().filter(|r| !r.in_use).collect()
    }

    /// Room currently operating on `patient_id`
    pub fn room_of(&self, patient_id: &str) -> Option<&OperatingRoom> {
        self.rooms
            .iter()
            .find(|r| r.patient_id.as_deref() == Some(patient_id))
    }

    /// Book a room and a surgeon for `duration` hours starting at `now`
    ///
    /// # Errors
    ///
    /// - `UnknownRoom` / `UnknownStaff` for bad identifiers
    /// - `NotASurgeon` if `surgeon_id` is a nurse
    /// - `InvalidDuration` if `duration` is zero
    /// - `RoomBusy` if the room is in use
    /// - `StaffUnavailable` if the surgeon is resting, off duty, or assigned
    ///
    /// Nothing is modified on error.
    pub fn start_surgery(
        &mut self,
        room_id: &str,
        patient_id: &str,
        surgeon_id: &str,
        now: usize,
        duration: usize,
    ) -> Result<usize, ResourceError> {
        if duration == 0 {
            return Err(ResourceError::InvalidDuration);
        }

        let room_idx = self
            .rooms
            .iter()
            .position(|r| r.id == room_id)
            .ok_or_else(|| ResourceError::UnknownRoom(room_id.to_string()))?;
        let staff_idx = self.staff_index(surgeon_id)?;

        if self.staff[staff_idx].role() != StaffRole::Surgeon {
            return Err(ResourceError::NotASurgeon(surgeon_id.to_string()));
        }
        if self.rooms[room_idx].in_use {
            return Err(ResourceError::RoomBusy(room_id.to_string()));
        }
        if !self.staff[staff_idx].is_available() {
            return Err(ResourceError::StaffUnavailable(surgeon_id.to_string()));
        }

        let end_hour = now + duration;
        let room = &mut self.rooms[room_idx];
        room.in_use = true;
        room.patient_id = Some(patient_id.to_string());
        room.surgeon_id = Some(surgeon_id.to_string());
        room.surgery_start_hour = Some(now);
        room.surgery_end_hour = Some(end_hour);
        self.staff[staff_idx].assign(patient_id.to_string());

        Ok(end_hour)
    }

    /// Release every room whose end hour has been reached, and its surgeon
    pub fn check_completed_surgeries(&mut self, now: usize) -> Vec<CompletedSurgery> {
        let mut completed = Vec::new();

        for room in self.rooms.iter_mut() {
            let done = room.in_use && room.surgery_end_hour.is_some_and(|end| end <= now);
            if !done {
                continue;
            }
            let (patient_id, surgeon_id) = room.clear();
            let (Some(patient_id), Some(surgeon_id)) = (patient_id, surgeon_id) else {
                continue;
            };
            if let Some(surgeon) = self.staff.iter_mut().find(|s| s.id() == surgeon_id) {
                if surgeon.current_patient() == Some(patient_id.as_str()) {
                    surgeon.release();
                }
            }
            completed.push(CompletedSurgery {
                room_id: room.id.clone(),
                patient_id,
                surgeon_id,
            });
        }

        completed
    }
}
