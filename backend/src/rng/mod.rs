//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm. Every stochastic decision in the
//! simulation (population draws, deterioration deaths, readmissions,
//! fatigue errors) goes through a single engine-owned [`RngManager`].

mod xorshift;

pub use xorshift::RngManager;
