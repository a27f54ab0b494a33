//! Interest accrual — interval-prorated growth of active debts.
//!
//! Each active instrument accrues floor(balance × interval_rate ×
//! elapsed_intervals) and the same amount is debited from the debtor's
//! cash balance, which may go negative. An instrument that would push
//! either counter past i64 bounds is skipped with a warning, never
//! partially updated — one bad record must not block the batch.

use crate::{
    config::EngineConfig,
    error::EngineResult,
    event::TickEvent,
    rng::StageRng,
    stage::TickStage,
    store::MarketStore,
    types::{AssetId, Money, Tick},
};

pub const DEBT_STATUS_ACTIVE: &str = "active";
pub const DEBT_STATUS_PAID: &str = "paid";

/// A debt as the accrual engine sees it. Balances only grow here;
/// repayment (and the transition to 'paid') belongs to the banking
/// surface.
#[derive(Debug, Clone)]
pub struct DebtRecord {
    pub debt_id: AssetId,
    pub debtor_id: AssetId,
    pub principal: Money,
    pub daily_rate_pct: f64,
    pub remaining_balance: Money,
    pub accrued_interest_total: Money,
    pub last_accrual_ms: i64,
    pub status: String,
}

pub struct InterestEngine {
    interval_ms: i64,
    intervals_per_day: f64,
    max_intervals: i64,
}

impl InterestEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            interval_ms: config.accrual_interval_ms(),
            intervals_per_day: config.intervals_per_day(),
            max_intervals: config.max_accrual_intervals,
        }
    }
}

impl TickStage for InterestEngine {
    fn name(&self) -> &'static str {
        "interest"
    }

    fn run(
        &mut self,
        tick: Tick,
        now_ms: i64,
        store: &MarketStore,
        _rng: &mut StageRng,
    ) -> EngineResult<Vec<TickEvent>> {
        let mut events = Vec::new();

        for debt in store.active_debts()? {
            let elapsed_ms = now_ms - debt.last_accrual_ms;
            if elapsed_ms < self.interval_ms {
                continue;
            }
            let intervals = (elapsed_ms / self.interval_ms).min(self.max_intervals);

            let interval_rate = debt.daily_rate_pct / 100.0 / self.intervals_per_day;
            let interest =
                (debt.remaining_balance as f64 * interval_rate * intervals as f64).floor();
            if !interest.is_finite() || interest < 0.0 || interest >= i64::MAX as f64 {
                log::warn!(
                    "tick={tick} debt {}: interest {interest} out of range, skipping",
                    debt.debt_id
                );
                continue;
            }
            let interest = interest as Money;

            let (Some(new_balance), Some(new_accrued)) = (
                debt.remaining_balance.checked_add(interest),
                debt.accrued_interest_total.checked_add(interest),
            ) else {
                log::warn!(
                    "tick={tick} debt {}: balance would overflow, skipping",
                    debt.debt_id
                );
                continue;
            };

            store.apply_accrual(&debt.debt_id, new_balance, new_accrued, now_ms)?;
            store.adjust_entity_balance(&debt.debtor_id, -interest)?;

            if interest > 0 {
                events.push(TickEvent::InterestAccrued {
                    debt_id: debt.debt_id,
                    interest,
                    new_balance,
                });
            }
        }

        log::debug!("tick={tick} interest: {} accruals", events.len());
        Ok(events)
    }
}
