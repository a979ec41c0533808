//! Core building blocks: the simulation clock and canonical digests

pub mod digest;
pub mod time;

pub use digest::canonical_digest;
pub use time::SimClock;
