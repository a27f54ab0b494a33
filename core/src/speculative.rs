//! Speculative-asset price simulation.
//!
//! The same per-tick volatility derivation as equities, but no
//! fundamental anchor and no mean reversion — a pure random walk at
//! double amplitude. The only rails are the per-tick move clamp and
//! the one-minor-unit floor.

use crate::{
    config::EngineConfig,
    error::EngineResult,
    event::TickEvent,
    rng::StageRng,
    stage::TickStage,
    store::MarketStore,
    types::{AssetId, Money, Tick},
};

/// A fundamental-free tradeable token.
#[derive(Debug, Clone)]
pub struct SpeculativeRecord {
    pub asset_id: AssetId,
    pub symbol: String,
    pub price: Money,
    pub previous_price: Money,
    pub circulating_supply: i64,
    pub volatility_estimate: f64,
    pub market_cap: Money,
}

pub struct SpeculativeSimulator {
    max_move_pct: f64,
    price_floor: Money,
    ticks_per_year: f64,
    default_volatility: f64,
}

impl SpeculativeSimulator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_move_pct: config.max_move_pct,
            price_floor: config.speculative_price_floor,
            ticks_per_year: config.ticks_per_year(),
            default_volatility: config.default_volatility,
        }
    }
}

impl TickStage for SpeculativeSimulator {
    fn name(&self) -> &'static str {
        "speculative"
    }

    fn run(
        &mut self,
        tick: Tick,
        now_ms: i64,
        store: &MarketStore,
        rng: &mut StageRng,
    ) -> EngineResult<Vec<TickEvent>> {
        let mut events = Vec::new();

        for asset in store.speculative_assets()? {
            let volatility = if asset.volatility_estimate > 0.0 {
                asset.volatility_estimate
            } else {
                self.default_volatility
            };
            let tick_vol = volatility / self.ticks_per_year.sqrt();

            // Double amplitude vs. equities, single noise draw.
            let random_factor = 1.0 + tick_vol * rng.next_signed_unit() * 2.0;
            let target = (asset.price as f64 * random_factor).floor();
            if !target.is_finite() {
                log::warn!(
                    "tick={tick} speculative {}: non-finite target, skipping",
                    asset.asset_id
                );
                continue;
            }

            let low = (asset.price as f64 * (1.0 - self.max_move_pct)).floor() as Money;
            let high = (asset.price as f64 * (1.0 + self.max_move_pct)).floor() as Money;
            let new_price = (target as Money).clamp(low, high).max(self.price_floor);

            if new_price == asset.price {
                continue;
            }

            let Some(market_cap) = new_price.checked_mul(asset.circulating_supply) else {
                log::warn!(
                    "tick={tick} speculative {}: market cap overflow, skipping",
                    asset.asset_id
                );
                continue;
            };

            store.apply_speculative_price(&asset.asset_id, asset.price, new_price, market_cap)?;
            store.append_price_history("speculative", &asset.asset_id, tick, new_price, now_ms)?;

            events.push(TickEvent::SpeculativePriceUpdated {
                asset_id: asset.asset_id,
                old_price: asset.price,
                new_price,
            });
        }

        log::debug!("tick={tick} speculative: {} price updates", events.len());
        Ok(events)
    }
}
