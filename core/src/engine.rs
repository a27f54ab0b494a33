//! The tick driver — one call advances the whole market.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Demand allocation
//!   2. Equity price simulation
//!   3. Speculative-asset price simulation
//!   4. Interest accrual
//!
//! RULES:
//!   - Stages execute in registration order, every tick.
//!   - Each stage commits through the store before the next begins;
//!     there is no cross-stage rollback.
//!   - All randomness flows through the RngBank.
//!   - Exactly one TickRecord is written per completed tick. Its
//!     tick_number is unique in the schema, so a second driver racing
//!     on the same store fails at insert instead of double-recording.

use crate::{
    clock::TimeSource,
    config::EngineConfig,
    demand::DemandAllocator,
    equity::EquitySimulator,
    error::EngineResult,
    event::{TickEvent, TickRecord},
    interest::InterestEngine,
    rng::{RngBank, StageSlot},
    speculative::SpeculativeSimulator,
    stage::TickStage,
    store::MarketStore,
    types::Tick,
};

/// What one tick did, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    pub tick_number: Tick,
    pub purchase_count: usize,
    pub equity_update_count: usize,
    pub speculative_update_count: usize,
}

pub struct TickEngine {
    config: EngineConfig,
    rng_bank: RngBank,
    clock: Box<dyn TimeSource>,
    stages: Vec<(StageSlot, Box<dyn TickStage>)>,
    store: MarketStore,
}

impl TickEngine {
    pub fn new(
        config: EngineConfig,
        store: MarketStore,
        clock: Box<dyn TimeSource>,
        seed: u64,
    ) -> Self {
        Self {
            rng_bank: RngBank::new(seed),
            clock,
            stages: Vec::new(),
            store,
            config,
        }
    }

    /// Build a fully wired engine with all stages registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(
        config: EngineConfig,
        store: MarketStore,
        clock: Box<dyn TimeSource>,
        seed: u64,
    ) -> Self {
        let mut engine = TickEngine::new(config.clone(), store, clock, seed);

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(StageSlot::Demand, Box::new(DemandAllocator::new(&config)));
        engine.register(StageSlot::Equity, Box::new(EquitySimulator::new(&config)));
        engine.register(
            StageSlot::Speculative,
            Box::new(SpeculativeSimulator::new(&config)),
        );
        engine.register(StageSlot::Interest, Box::new(InterestEngine::new(&config)));
        engine
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, slot: StageSlot, stage: Box<dyn TickStage>) {
        self.stages.push((slot, stage));
    }

    /// Advance the market by one tick. This is the single entry point
    /// for both the scheduled path and the manual trigger.
    ///
    /// A stage error aborts the remaining stages for this tick;
    /// whatever earlier stages committed stays committed. The next
    /// call proceeds from current state under a new, higher number.
    pub fn run_tick(&mut self) -> EngineResult<TickSummary> {
        let last = self.store.last_tick_number()?;
        let tick = last + 1;
        let now_ms = self.clock.now_ms();

        let mut events: Vec<TickEvent> = Vec::new();
        for (slot, stage) in &mut self.stages {
            let mut rng = self.rng_bank.for_stage(*slot, tick);
            let stage_events = stage.run(tick, now_ms, &self.store, &mut rng)?;
            events.extend(stage_events);
        }

        let record = TickRecord::from_events(tick, now_ms, &events);
        self.store.insert_tick_record(&record)?;

        let summary = TickSummary {
            tick_number: tick,
            purchase_count: record.purchase_events.len(),
            equity_update_count: record.equity_price_events.len(),
            speculative_update_count: record.speculative_price_events.len(),
        };

        log::info!(
            "tick={} purchases={} equity={} speculative={} spent={}",
            tick,
            summary.purchase_count,
            summary.equity_update_count,
            summary.speculative_update_count,
            record.total_budget_spent
        );

        Ok(summary)
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> EngineResult<()> {
        for _ in 0..n {
            self.run_tick()?;
        }
        Ok(())
    }

    /// The engine's store handle. Used by the runner and tests to
    /// inspect market state between ticks.
    pub fn store(&self) -> &MarketStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
