//! Deterministic random number generation.
//!
//! RULE: Nothing in the engine may call any platform RNG.
//! All randomness flows through StageRng instances derived from the
//! single master seed the engine was built with.
//!
//! Each stage gets its own stream, seeded deterministically from
//! (master_seed, stage_index, tick). This means:
//!   - Adding a new stage never changes existing stages' streams.
//!   - Any one tick of any one stage is reproducible in isolation.

use crate::types::Tick;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single stage of a single tick.
pub struct StageRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StageRng {
    /// Create a stage RNG from the master seed, a stable stage index,
    /// and the tick number. The index must never change once assigned.
    pub fn new(master_seed: u64, stage_index: u64, tick: Tick) -> Self {
        let derived_seed = master_seed
            ^ stage_index.wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ tick.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform noise sample in [-1.0, 1.0).
    pub fn next_signed_unit(&mut self) -> f64 {
        self.next_f64() * 2.0 - 1.0
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}

/// Factory for all stage RNGs of one engine instance.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stage(&self, slot: StageSlot, tick: Tick) -> StageRng {
        StageRng::new(self.master_seed, slot as u64, tick).with_name(slot.name())
    }
}

/// Stable stage slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stage's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StageSlot {
    Demand = 0,
    Equity = 1,
    Speculative = 2,
    Interest = 3,
    // Add new stages here — append only.
}

impl StageSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Demand => "demand",
            Self::Equity => "equity",
            Self::Speculative => "speculative",
            Self::Interest => "interest",
        }
    }
}
