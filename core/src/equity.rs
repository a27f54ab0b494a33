//! Equity price simulation.
//!
//! A mean-reverting stochastic walk: each tick, every listed
//! instrument's price takes a small random step, gets blended toward a
//! fundamental valuation derived from the issuer's revenue and
//! multiple, and is clamped to a maximum per-tick move. A slow
//! sinusoidal trend term keeps instruments drifting independently of
//! each other hour-to-hour.

use crate::{
    config::EngineConfig,
    error::EngineResult,
    event::TickEvent,
    rng::StageRng,
    stage::TickStage,
    store::MarketStore,
    types::{AssetId, Money, Tick},
};

/// An issuer as the equity simulator sees it.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub entity_id: AssetId,
    pub name: String,
    pub balance: Money,
    pub is_listed: bool,
    pub annual_revenue_estimate: Money,
    pub fundamental_multiple: f64,
    pub growth_rate_pct: f64,
    pub sentiment_score: f64,
    pub volatility_estimate: f64,
    pub market_cap: Money,
}

/// A tradeable share tied to a listed entity.
#[derive(Debug, Clone)]
pub struct EquityRecord {
    pub instrument_id: AssetId,
    pub entity_id: AssetId,
    pub price: Money,
    pub previous_price: Money,
    pub units_outstanding: i64,
    pub market_cap: Money,
}

pub struct EquitySimulator {
    alpha: f64,
    max_move_pct: f64,
    price_floor: Money,
    ticks_per_year: f64,
    default_volatility: f64,
}

impl EquitySimulator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            alpha: config.mean_reversion_alpha,
            max_move_pct: config.max_move_pct,
            price_floor: config.equity_price_floor,
            ticks_per_year: config.ticks_per_year(),
            default_volatility: config.default_volatility,
        }
    }

    /// Per-share valuation anchor: revenue × an adjusted multiple,
    /// floored at each division. None if the arithmetic degenerates.
    fn fundamental_price(entity: &EntityRecord, units_outstanding: i64) -> Option<Money> {
        let multiple = entity.fundamental_multiple
            * (1.0 + entity.growth_rate_pct * 0.5 / 100.0 + entity.sentiment_score * 0.2);
        let market_cap = (entity.annual_revenue_estimate as f64 * multiple).floor();
        if !market_cap.is_finite() || market_cap < 0.0 {
            return None;
        }
        Some((market_cap / units_outstanding as f64).floor() as Money)
    }

    /// Slowly varying drift: a daily-period sinusoid of wall-clock
    /// time, phase-shifted per instrument so issuers trend apart while
    /// each stays smooth hour-to-hour.
    fn trend_bias(&self, now_ms: i64, instrument_id: &str, tick_vol: f64) -> f64 {
        let phase = (stable_hash(instrument_id) % 10_000) as f64 / 10_000.0 * std::f64::consts::TAU;
        let day_fraction = now_ms as f64 / 86_400_000.0;
        (day_fraction * std::f64::consts::TAU + phase).sin() * tick_vol * 0.5
    }
}

impl TickStage for EquitySimulator {
    fn name(&self) -> &'static str {
        "equity"
    }

    fn run(
        &mut self,
        tick: Tick,
        now_ms: i64,
        store: &MarketStore,
        rng: &mut StageRng,
    ) -> EngineResult<Vec<TickEvent>> {
        let mut events = Vec::new();

        for (equity, entity) in store.listed_equities()? {
            if equity.units_outstanding <= 0 {
                log::warn!(
                    "tick={tick} equity {}: no units outstanding, skipping",
                    equity.instrument_id
                );
                continue;
            }
            let Some(fundamental) = Self::fundamental_price(&entity, equity.units_outstanding)
            else {
                log::warn!(
                    "tick={tick} equity {}: degenerate fundamentals, skipping",
                    equity.instrument_id
                );
                continue;
            };

            let volatility = if entity.volatility_estimate > 0.0 {
                entity.volatility_estimate
            } else {
                self.default_volatility
            };
            let tick_vol = volatility / self.ticks_per_year.sqrt();

            let short_term = rng.next_signed_unit() * tick_vol;
            let medium_term = rng.next_signed_unit() * tick_vol * 0.5;
            let bias = self.trend_bias(now_ms, &equity.instrument_id, tick_vol);

            let random_factor = 1.0 + short_term + medium_term + bias;
            let target = equity.price as f64 * random_factor;
            let blended = (target * (1.0 - self.alpha) + fundamental as f64 * self.alpha).floor();
            if !blended.is_finite() {
                log::warn!(
                    "tick={tick} equity {}: non-finite target, skipping",
                    equity.instrument_id
                );
                continue;
            }

            let low = (equity.price as f64 * (1.0 - self.max_move_pct)).floor() as Money;
            let high = (equity.price as f64 * (1.0 + self.max_move_pct)).floor() as Money;
            let new_price = (blended as Money).clamp(low, high).max(self.price_floor);

            if new_price == equity.price {
                continue;
            }

            let Some(market_cap) = new_price.checked_mul(equity.units_outstanding) else {
                log::warn!(
                    "tick={tick} equity {}: market cap overflow, skipping",
                    equity.instrument_id
                );
                continue;
            };

            store.apply_equity_price(&equity.instrument_id, equity.price, new_price, market_cap)?;
            store.set_entity_market_cap(&equity.entity_id, market_cap)?;
            store.append_price_history("equity", &equity.instrument_id, tick, new_price, now_ms)?;

            events.push(TickEvent::EquityPriceUpdated {
                instrument_id: equity.instrument_id,
                old_price: equity.price,
                new_price,
            });
        }

        log::debug!("tick={tick} equity: {} price updates", events.len());
        Ok(events)
    }
}

/// FNV-1a. Stable across runs and platforms, unlike the std hasher.
fn stable_hash(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
