//! Tick events and the persisted tick record.
//!
//! Stages report what they did as events; the driver folds one tick's
//! event stream into a single TickRecord — the engine's audit log.
//! Records are append-only and never mutated after creation.

use crate::types::{AssetId, Money, Tick};
use serde::{Deserialize, Serialize};

/// Every event a stage can emit during a tick.
/// Variants are added as stages grow — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TickEvent {
    PurchaseMade {
        listing_id: AssetId,
        entity_id: AssetId,
        quantity: i64,
        total_price: Money,
    },
    EquityPriceUpdated {
        instrument_id: AssetId,
        old_price: Money,
        new_price: Money,
    },
    SpeculativePriceUpdated {
        asset_id: AssetId,
        old_price: Money,
        new_price: Money,
    },
    InterestAccrued {
        debt_id: AssetId,
        interest: Money,
        new_balance: Money,
    },
}

/// One purchase line as persisted inside a tick record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseEvent {
    pub listing_id: AssetId,
    pub entity_id: AssetId,
    pub quantity: i64,
    pub total_price: Money,
}

/// One price move as persisted inside a tick record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceEvent {
    pub asset_id: AssetId,
    pub old_price: Money,
    pub new_price: Money,
}

/// The append-only audit row one run_tick() writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick_number: Tick,
    pub timestamp_ms: i64,
    pub purchase_events: Vec<PurchaseEvent>,
    pub equity_price_events: Vec<PriceEvent>,
    pub speculative_price_events: Vec<PriceEvent>,
    pub total_budget_spent: Money,
}

impl TickRecord {
    /// Fold a tick's event stream into the persisted record shape.
    pub fn from_events(tick: Tick, timestamp_ms: i64, events: &[TickEvent]) -> Self {
        let mut record = Self {
            tick_number: tick,
            timestamp_ms,
            purchase_events: Vec::new(),
            equity_price_events: Vec::new(),
            speculative_price_events: Vec::new(),
            total_budget_spent: 0,
        };

        for event in events {
            match event {
                TickEvent::PurchaseMade {
                    listing_id,
                    entity_id,
                    quantity,
                    total_price,
                } => {
                    record.total_budget_spent += total_price;
                    record.purchase_events.push(PurchaseEvent {
                        listing_id: listing_id.clone(),
                        entity_id: entity_id.clone(),
                        quantity: *quantity,
                        total_price: *total_price,
                    });
                }
                TickEvent::EquityPriceUpdated {
                    instrument_id,
                    old_price,
                    new_price,
                } => record.equity_price_events.push(PriceEvent {
                    asset_id: instrument_id.clone(),
                    old_price: *old_price,
                    new_price: *new_price,
                }),
                TickEvent::SpeculativePriceUpdated {
                    asset_id,
                    old_price,
                    new_price,
                } => record.speculative_price_events.push(PriceEvent {
                    asset_id: asset_id.clone(),
                    old_price: *old_price,
                    new_price: *new_price,
                }),
                // Interest feeds logs, not the tick record arrays.
                TickEvent::InterestAccrued { .. } => {}
            }
        }

        record
    }
}
