//! xorshift64* random number generator
//!
//! Same seed → same sequence. Replaying a run from its seed and operation
//! trace depends on every draw happening in the same order, so callers must
//! not branch on anything nondeterministic (e.g. `HashMap` iteration order)
//! before drawing.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use triage_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(42);
/// let hour = rng.range(0, 6); // [0, 6)
/// assert!((0..6).contains(&hour));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is replaced with 1 (xorshift requires non-zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Pick an index in `[0, len)`
    ///
    /// # Panics
    /// Panics if `len` is zero
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty collection");
        (self.next() % len as u64) as usize
    }

    /// Get current RNG state (for checkpointing/replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Bernoulli trial: true with probability `p`
    ///
    /// Always consumes exactly one draw, even for `p <= 0` or `p >= 1`, so
    /// the stream position does not depend on the probability value.
    ///
    /// # Example
    /// ```
    /// use triage_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// assert!(!rng.chance(0.0));
    /// assert!(rng.chance(1.0));
    /// ```
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample an index proportionally to `weights`
    ///
    /// Non-positive weights are never selected. If every weight is
    /// non-positive the last index is returned.
    ///
    /// # Panics
    /// Panics if `weights` is empty
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "weights must not be empty");

        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        let last = weights.len() - 1;
        if total <= 0.0 {
            return last;
        }

        let mut target = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            if target < *w {
                return i;
            }
            target -= w;
        }
        // Floating point slack: fall back to the last positive weight
        weights.iter().rposition(|w| *w > 0.0).unwrap_or(last)
    }
}
