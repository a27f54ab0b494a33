//! Stage trait — the contract every engine pass fulfills.
//!
//! RULE: The driver calls run() on each registered stage in
//! registration order, every tick. Execution order is fixed and
//! documented in engine.rs. Stages persist through the store and
//! report what they did as events; no stage calls another stage.

use crate::{error::EngineResult, event::TickEvent, rng::StageRng, store::MarketStore, types::Tick};

pub trait TickStage: Send {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Called once per tick by the driver.
    ///
    /// - `tick`:   the tick number being advanced
    /// - `now_ms`: wall-clock time from the injected TimeSource
    /// - `store`:  the persistence layer; every write commits before
    ///             the next stage runs
    /// - `rng`:    this stage's deterministic RNG for this tick
    fn run(
        &mut self,
        tick: Tick,
        now_ms: i64,
        store: &MarketStore,
        rng: &mut StageRng,
    ) -> EngineResult<Vec<TickEvent>>;
}
