//! Demand allocation — synthetic buyer spend across storefront listings.
//!
//! Every tick, a fixed bot budget is split across eligible listings in
//! proportion to an attractiveness score, then converted to whole-unit
//! purchases. Floor division everywhere means total spend never exceeds
//! the budget; leftover budget is discarded, never carried forward.

use crate::{
    config::{EngineConfig, ScoreWeights},
    error::EngineResult,
    event::TickEvent,
    rng::StageRng,
    stage::TickStage,
    store::MarketStore,
    types::{AssetId, Money, Tick},
};
use std::cmp::Ordering;

/// A storefront listing as the allocator sees it.
#[derive(Debug, Clone)]
pub struct ListingRecord {
    pub listing_id: AssetId,
    pub owner_id: AssetId,
    pub sell_price: Money,
    pub unit_cost: Money,
    /// None = unlimited stock.
    pub stock_on_hand: Option<i64>,
    /// None = no per-tick sales cap.
    pub max_units_per_tick: Option<i64>,
    pub quality_score: f64,
    pub units_sold: i64,
    pub revenue: Money,
    pub active: bool,
}

/// Pluggable per-listing desirability metric. Implementations must
/// return a value in [0, 1]; the allocation loop treats the scores as
/// budget shares.
pub trait ListingScorer: Send {
    fn score(&self, listing: &ListingRecord) -> f64;
}

/// The default scorer: weighted quality + price preference + proven
/// demand, discounted for very expensive listings.
pub struct WeightedScorer {
    weights: ScoreWeights,
    ln_sweet_spot: f64,
    sigma: f64,
    demand_saturation: f64,
    penalty_pivot_major: f64,
    penalty_exponent: f64,
}

impl WeightedScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            ln_sweet_spot: (config.sweet_spot_price.max(1) as f64).ln(),
            sigma: config.price_preference_sigma,
            demand_saturation: config.demand_saturation_units.max(1) as f64,
            penalty_pivot_major: config.penalty_pivot_major,
            penalty_exponent: config.penalty_exponent,
        }
    }
}

impl ListingScorer for WeightedScorer {
    fn score(&self, listing: &ListingRecord) -> f64 {
        let quality = listing.quality_score.clamp(0.0, 1.0);

        // Gaussian in log-price space, centered on the sweet spot:
        // mid-range prices beat both bargain-bin and luxury extremes.
        let deviation = (listing.sell_price as f64).ln() - self.ln_sweet_spot;
        let price_preference = (-(deviation * deviation) / (2.0 * self.sigma * self.sigma)).exp();

        let demand = (listing.units_sold as f64 / self.demand_saturation).min(1.0);

        let raw = self.weights.quality * quality
            + self.weights.price_preference * price_preference
            + self.weights.demand * demand
            + self.weights.base;

        let price_major = listing.sell_price as f64 / 100.0;
        let penalty =
            1.0 / (1.0 + (price_major / self.penalty_pivot_major).powf(self.penalty_exponent));

        (raw * penalty).clamp(0.0, 1.0)
    }
}

pub struct DemandAllocator {
    budget: Money,
    price_cap: Money,
    scorer: Box<dyn ListingScorer>,
}

impl DemandAllocator {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_scorer(config, Box::new(WeightedScorer::new(config)))
    }

    pub fn with_scorer(config: &EngineConfig, scorer: Box<dyn ListingScorer>) -> Self {
        Self {
            budget: config.bot_budget,
            price_cap: config.listing_price_cap,
            scorer,
        }
    }
}

impl TickStage for DemandAllocator {
    fn name(&self) -> &'static str {
        "demand"
    }

    fn run(
        &mut self,
        tick: Tick,
        _now_ms: i64,
        store: &MarketStore,
        _rng: &mut StageRng,
    ) -> EngineResult<Vec<TickEvent>> {
        let listings = store.eligible_listings(self.price_cap)?;
        if listings.is_empty() {
            return Ok(vec![]);
        }

        let mut scored: Vec<(f64, ListingRecord)> = listings
            .into_iter()
            .map(|l| (self.scorer.score(&l), l))
            .collect();

        let total_score: f64 = scored.iter().map(|(s, _)| s).sum();
        if total_score <= 0.0 {
            return Ok(vec![]);
        }

        // Highest score first: when the running budget truncates
        // mid-loop, the most attractive listings keep their share.
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.listing_id.cmp(&b.1.listing_id))
        });

        let mut remaining = self.budget;
        let mut events = Vec::new();

        for (score, listing) in &scored {
            if remaining <= 0 {
                break;
            }

            // Share of the original budget; the remaining counter only
            // matters once earlier listings have eaten into it.
            let desired_spend = (self.budget as f64 * score / total_score).floor() as Money;
            if desired_spend < listing.sell_price {
                continue;
            }

            let mut quantity = desired_spend / listing.sell_price;
            if let Some(stock) = listing.stock_on_hand {
                quantity = quantity.min(stock);
            }
            if let Some(cap) = listing.max_units_per_tick {
                quantity = quantity.min(cap);
            }
            if quantity * listing.sell_price > remaining {
                quantity = remaining / listing.sell_price;
            }
            if quantity <= 0 {
                continue;
            }

            let total_price = quantity * listing.sell_price;
            store.record_sale(&listing.listing_id, quantity, total_price)?;
            store.adjust_entity_balance(&listing.owner_id, total_price)?;
            remaining -= total_price;

            events.push(TickEvent::PurchaseMade {
                listing_id: listing.listing_id.clone(),
                entity_id: listing.owner_id.clone(),
                quantity,
                total_price,
            });
        }

        log::debug!(
            "tick={tick} demand: {} purchases, spent {} of {}",
            events.len(),
            self.budget - remaining,
            self.budget
        );

        Ok(events)
    }
}
