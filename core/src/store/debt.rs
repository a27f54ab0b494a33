//! Store methods for debt instruments.

use super::MarketStore;
use crate::{error::EngineResult, interest::DebtRecord, types::Money};
use rusqlite::params;

impl MarketStore {
    pub fn insert_debt(&self, d: &DebtRecord) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO debt_instrument (
                debt_id, debtor_id, principal, daily_rate_pct,
                remaining_balance, accrued_interest_total, last_accrual_ms, status
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                &d.debt_id,
                &d.debtor_id,
                d.principal,
                d.daily_rate_pct,
                d.remaining_balance,
                d.accrued_interest_total,
                d.last_accrual_ms,
                &d.status,
            ],
        )?;
        Ok(())
    }

    pub fn active_debts(&self) -> EngineResult<Vec<DebtRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT debt_id, debtor_id, principal, daily_rate_pct,
                    remaining_balance, accrued_interest_total, last_accrual_ms, status
             FROM debt_instrument WHERE status = 'active'",
        )?;
        let rows = stmt.query_map([], debt_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_debt(&self, debt_id: &str) -> EngineResult<DebtRecord> {
        self.conn()
            .query_row(
                "SELECT debt_id, debtor_id, principal, daily_rate_pct,
                        remaining_balance, accrued_interest_total, last_accrual_ms, status
                 FROM debt_instrument WHERE debt_id = ?1",
                params![debt_id],
                debt_row,
            )
            .map_err(Into::into)
    }

    /// Commit one accrual: balance and lifetime-interest counters grow
    /// together, and the accrual timestamp advances to now.
    pub fn apply_accrual(
        &self,
        debt_id: &str,
        new_balance: Money,
        new_accrued_total: Money,
        now_ms: i64,
    ) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE debt_instrument
             SET remaining_balance = ?1, accrued_interest_total = ?2, last_accrual_ms = ?3
             WHERE debt_id = ?4",
            params![new_balance, new_accrued_total, now_ms, debt_id],
        )?;
        Ok(())
    }
}

fn debt_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DebtRecord> {
    Ok(DebtRecord {
        debt_id: row.get(0)?,
        debtor_id: row.get(1)?,
        principal: row.get(2)?,
        daily_rate_pct: row.get(3)?,
        remaining_balance: row.get(4)?,
        accrued_interest_total: row.get(5)?,
        last_accrual_ms: row.get(6)?,
        status: row.get(7)?,
    })
}
