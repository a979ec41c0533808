//! Blood bank inventory
//!
//! # Draw Flow
//!
//! ```text
//! request(recipient, units)
//!   → total compatible stock >= units ?  no → InsufficientBlood (no change)
//!   → yes: exact type first, then each compatible donor in preference
//!          order, taking min(stock, still_needed) from each
//! ```
//!
//! # Critical Invariants
//!
//! - **Atomicity**: a draw either takes every requested unit or nothing
//! - **Non-negative**: no type ever drops below zero
//! - **Bounded**: stock never exceeds the initial supply (there is no restock)

use crate::models::blood::{BloodDraw, BloodType};
use crate::resources::ResourceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-type unit counts plus the supply the run started with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodBank {
    inventory: BTreeMap<BloodType, u32>,
    initial_supply: BTreeMap<BloodType, u32>,
}

impl BloodBank {
    /// Build a bank from an initial supply. Types missing from `supply` start
    /// at zero.
    ///
    /// # Example
    /// ```rust
    /// use triage_simulator_core_rs::resources::BloodBank;
    /// use triage_simulator_core_rs::BloodType;
    /// use std::collections::BTreeMap;
    ///
    /// let bank = BloodBank::new(BTreeMap::from([(BloodType::ONeg, 5)]));
    /// assert_eq!(bank.units(BloodType::ONeg), 5);
    /// assert_eq!(bank.units(BloodType::AbNeg), 0);
    /// ```
    pub fn new(supply: BTreeMap<BloodType, u32>) -> Self {
        let inventory: BTreeMap<BloodType, u32> = BloodType::ALL
            .iter()
            .map(|t| (*t, supply.get(t).copied().unwrap_or(0)))
            .collect();
        Self {
            initial_supply: inventory.clone(),
            inventory,
        }
    }

    pub fn units(&self, blood_type: BloodType) -> u32 {
        self.inventory.get(&blood_type).copied().unwrap_or(0)
    }

    pub fn inventory(&self) -> &BTreeMap<BloodType, u32> {
        &self.inventory
    }

    pub fn initial_supply(&self) -> &BTreeMap<BloodType, u32> {
        &self.initial_supply
    }

    pub fn total_units(&self) -> u32 {
        self.inventory.values().sum()
    }

    /// Units drawn since the start of the run
    pub fn units_consumed(&self) -> u32 {
        self.initial_supply.values().sum::<u32>() - self.total_units()
    }

    /// Stock usable by a recipient across all compatible donor types
    pub fn compatible_stock(&self, recipient: BloodType) -> u32 {
        recipient
            .compatible_donors()
            .iter()
            .map(|donor| self.units(*donor))
            .sum()
    }

    /// Draw `units` for a `recipient`, all-or-nothing
    ///
    /// Returns the per-type breakdown of what was taken, in draw order.
    ///
    /// # Errors
    ///
    /// - `InvalidUnits` if `units` is zero
    /// - `InsufficientBlood` if compatible stock cannot cover the request;
    ///   inventory is left untouched
    ///
    /// # Example
    /// ```rust
    /// use triage_simulator_core_rs::resources::BloodBank;
    /// use triage_simulator_core_rs::BloodType;
    /// use std::collections::BTreeMap;
    ///
    /// let mut bank = BloodBank::new(BTreeMap::from([(BloodType::ONeg, 5)]));
    /// let draws = bank.use_blood(BloodType::AbNeg, 2).unwrap();
    ///
    /// assert_eq!(draws.len(), 1);
    /// assert_eq!(draws[0].blood_type, BloodType::ONeg);
    /// assert_eq!(bank.units(BloodType::ONeg), 3);
    /// ```
    pub fn use_blood(
        &mut self,
        recipient: BloodType,
        units: u32,
    ) -> Result<Vec<BloodDraw>, ResourceError> {
        if units == 0 {
            return Err(ResourceError::InvalidUnits);
        }

        let available = self.compatible_stock(recipient);
        if available < units {
            return Err(ResourceError::InsufficientBlood {
                recipient,
                requested: units,
                available,
            });
        }

        let mut remaining = units;
        let mut draws = Vec::new();
        for donor in recipient.compatible_donors() {
            if remaining == 0 {
                break;
            }
            let Some(stock) = self.inventory.get_mut(donor) else {
                continue;
            };
            let take = (*stock).min(remaining);
            if take == 0 {
                continue;
            }
            *stock -= take;
            remaining -= take;
            draws.push(BloodDraw {
                blood_type: *donor,
                units: take,
            });
        }

        Ok(draws)
    }
}
