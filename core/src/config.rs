//! Engine configuration.
//!
//! Everything tunable about the tick engine lives here: the bot budget,
//! the two cadences, price rails, and the scoring constants. The
//! cadences are the single source of truth for the derived figures —
//! ticks_per_year() and intervals_per_day() — so the price simulators
//! and the interest engine can never disagree about them.

use crate::types::Money;
use serde::{Deserialize, Serialize};

/// Weights for the default listing scorer. Must sum to ~1.0 for the
/// score to stay in [0, 1] before the penalty is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub quality: f64,
    pub price_preference: f64,
    pub demand: f64,
    pub base: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Synthetic buyer spend per tick, minor units.
    pub bot_budget: Money,
    /// Scheduled tick cadence. Drives ticks_per_year().
    pub tick_interval_secs: u64,
    /// Interest accrual cadence. Drives intervals_per_day().
    pub accrual_interval_secs: u64,
    /// Listings priced above this never receive bot demand.
    pub listing_price_cap: Money,
    /// Hard floor for simulated equity prices.
    pub equity_price_floor: Money,
    /// Hard floor for simulated speculative-asset prices.
    pub speculative_price_floor: Money,
    /// Center of the price-preference curve, minor units.
    pub sweet_spot_price: Money,
    /// Width (log-space sigma) of the price-preference curve.
    pub price_preference_sigma: f64,
    pub weights: ScoreWeights,
    /// Unit-price penalty pivot, major units.
    pub penalty_pivot_major: f64,
    pub penalty_exponent: f64,
    /// Cumulative sales at which the demand term saturates.
    pub demand_saturation_units: i64,
    /// Mean-reversion strength toward the fundamental price.
    pub mean_reversion_alpha: f64,
    /// Maximum per-tick price move, both directions.
    pub max_move_pct: f64,
    /// Volatility fallback when an instrument carries none.
    pub default_volatility: f64,
    /// Overflow guard on elapsed accrual intervals.
    pub max_accrual_intervals: i64,
}

impl EngineConfig {
    /// Load from a JSON file. In tests, use EngineConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        Self {
            bot_budget: 10_000,
            tick_interval_secs: 300,
            accrual_interval_secs: 1_200,
            listing_price_cap: 1_000_000,
            equity_price_floor: 100,
            speculative_price_floor: 1,
            sweet_spot_price: 2_500,
            price_preference_sigma: 1.25,
            weights: ScoreWeights {
                quality: 0.4,
                price_preference: 0.3,
                demand: 0.2,
                base: 0.1,
            },
            penalty_pivot_major: 5_000.0,
            penalty_exponent: 1.2,
            demand_saturation_units: 100,
            mean_reversion_alpha: 0.03,
            max_move_pct: 0.30,
            default_volatility: 0.40,
            max_accrual_intervals: 365,
        }
    }

    /// Ticks per year at the configured cadence, continuous.
    /// 300 s → 105,120.
    pub fn ticks_per_year(&self) -> f64 {
        (365.0 * 86_400.0) / self.tick_interval_secs as f64
    }

    /// Accrual intervals per day at the configured cadence.
    /// 1,200 s → 72.
    pub fn intervals_per_day(&self) -> f64 {
        86_400.0 / self.accrual_interval_secs as f64
    }

    pub fn accrual_interval_ms(&self) -> i64 {
        self.accrual_interval_secs as i64 * 1_000
    }
}
