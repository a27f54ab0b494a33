//! Store methods for entities and the two tradeable asset classes.

use super::MarketStore;
use crate::{
    equity::{EntityRecord, EquityRecord},
    error::EngineResult,
    speculative::SpeculativeRecord,
    types::Money,
};
use rusqlite::params;

impl MarketStore {
    // ── Entity ─────────────────────────────────────────────────

    pub fn insert_entity(&self, e: &EntityRecord) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO entity (
                entity_id, name, balance, is_listed, annual_revenue_estimate,
                fundamental_multiple, growth_rate_pct, sentiment_score,
                volatility_estimate, market_cap
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &e.entity_id,
                &e.name,
                e.balance,
                if e.is_listed { 1 } else { 0 },
                e.annual_revenue_estimate,
                e.fundamental_multiple,
                e.growth_rate_pct,
                e.sentiment_score,
                e.volatility_estimate,
                e.market_cap,
            ],
        )?;
        Ok(())
    }

    pub fn get_entity(&self, entity_id: &str) -> EngineResult<EntityRecord> {
        self.conn()
            .query_row(
                "SELECT entity_id, name, balance, is_listed, annual_revenue_estimate,
                        fundamental_multiple, growth_rate_pct, sentiment_score,
                        volatility_estimate, market_cap
                 FROM entity WHERE entity_id = ?1",
                params![entity_id],
                entity_row,
            )
            .map_err(Into::into)
    }

    /// Signed balance adjustment. Sale proceeds credit with a positive
    /// delta; interest debits with a negative one. Balances may go
    /// negative — that is how debt becomes felt.
    pub fn adjust_entity_balance(&self, entity_id: &str, delta: Money) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE entity SET balance = balance + ?1 WHERE entity_id = ?2",
            params![delta, entity_id],
        )?;
        Ok(())
    }

    pub fn set_entity_market_cap(&self, entity_id: &str, market_cap: Money) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE entity SET market_cap = ?1 WHERE entity_id = ?2",
            params![market_cap, entity_id],
        )?;
        Ok(())
    }

    // ── Equity instruments ─────────────────────────────────────

    pub fn insert_equity(&self, eq: &EquityRecord) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO equity_instrument (
                instrument_id, entity_id, price, previous_price,
                units_outstanding, market_cap
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &eq.instrument_id,
                &eq.entity_id,
                eq.price,
                eq.previous_price,
                eq.units_outstanding,
                eq.market_cap,
            ],
        )?;
        Ok(())
    }

    /// Every instrument whose issuer is currently listed, paired with
    /// the issuer's fundamentals.
    pub fn listed_equities(&self) -> EngineResult<Vec<(EquityRecord, EntityRecord)>> {
        let mut stmt = self.conn().prepare(
            "SELECT q.instrument_id, q.entity_id, q.price, q.previous_price,
                    q.units_outstanding, q.market_cap,
                    e.entity_id, e.name, e.balance, e.is_listed, e.annual_revenue_estimate,
                    e.fundamental_multiple, e.growth_rate_pct, e.sentiment_score,
                    e.volatility_estimate, e.market_cap
             FROM equity_instrument q
             JOIN entity e ON e.entity_id = q.entity_id
             WHERE e.is_listed = 1",
        )?;
        let rows = stmt.query_map([], |row| {
            let equity = EquityRecord {
                instrument_id: row.get(0)?,
                entity_id: row.get(1)?,
                price: row.get(2)?,
                previous_price: row.get(3)?,
                units_outstanding: row.get(4)?,
                market_cap: row.get(5)?,
            };
            let entity = EntityRecord {
                entity_id: row.get(6)?,
                name: row.get(7)?,
                balance: row.get(8)?,
                is_listed: row.get::<_, i32>(9)? != 0,
                annual_revenue_estimate: row.get(10)?,
                fundamental_multiple: row.get(11)?,
                growth_rate_pct: row.get(12)?,
                sentiment_score: row.get(13)?,
                volatility_estimate: row.get(14)?,
                market_cap: row.get(15)?,
            };
            Ok((equity, entity))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_equity(&self, instrument_id: &str) -> EngineResult<EquityRecord> {
        self.conn()
            .query_row(
                "SELECT instrument_id, entity_id, price, previous_price,
                        units_outstanding, market_cap
                 FROM equity_instrument WHERE instrument_id = ?1",
                params![instrument_id],
                equity_row,
            )
            .map_err(Into::into)
    }

    pub fn apply_equity_price(
        &self,
        instrument_id: &str,
        previous_price: Money,
        new_price: Money,
        market_cap: Money,
    ) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE equity_instrument
             SET previous_price = ?1, price = ?2, market_cap = ?3
             WHERE instrument_id = ?4",
            params![previous_price, new_price, market_cap, instrument_id],
        )?;
        Ok(())
    }

    // ── Speculative assets ─────────────────────────────────────

    pub fn insert_speculative(&self, a: &SpeculativeRecord) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO speculative_asset (
                asset_id, symbol, price, previous_price,
                circulating_supply, volatility_estimate, market_cap
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &a.asset_id,
                &a.symbol,
                a.price,
                a.previous_price,
                a.circulating_supply,
                a.volatility_estimate,
                a.market_cap,
            ],
        )?;
        Ok(())
    }

    pub fn speculative_assets(&self) -> EngineResult<Vec<SpeculativeRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT asset_id, symbol, price, previous_price,
                    circulating_supply, volatility_estimate, market_cap
             FROM speculative_asset",
        )?;
        let rows = stmt.query_map([], speculative_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_speculative(&self, asset_id: &str) -> EngineResult<SpeculativeRecord> {
        self.conn()
            .query_row(
                "SELECT asset_id, symbol, price, previous_price,
                        circulating_supply, volatility_estimate, market_cap
                 FROM speculative_asset WHERE asset_id = ?1",
                params![asset_id],
                speculative_row,
            )
            .map_err(Into::into)
    }

    pub fn apply_speculative_price(
        &self,
        asset_id: &str,
        previous_price: Money,
        new_price: Money,
        market_cap: Money,
    ) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE speculative_asset
             SET previous_price = ?1, price = ?2, market_cap = ?3
             WHERE asset_id = ?4",
            params![previous_price, new_price, market_cap, asset_id],
        )?;
        Ok(())
    }
}

fn entity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EntityRecord> {
    Ok(EntityRecord {
        entity_id: row.get(0)?,
        name: row.get(1)?,
        balance: row.get(2)?,
        is_listed: row.get::<_, i32>(3)? != 0,
        annual_revenue_estimate: row.get(4)?,
        fundamental_multiple: row.get(5)?,
        growth_rate_pct: row.get(6)?,
        sentiment_score: row.get(7)?,
        volatility_estimate: row.get(8)?,
        market_cap: row.get(9)?,
    })
}

fn equity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EquityRecord> {
    Ok(EquityRecord {
        instrument_id: row.get(0)?,
        entity_id: row.get(1)?,
        price: row.get(2)?,
        previous_price: row.get(3)?,
        units_outstanding: row.get(4)?,
        market_cap: row.get(5)?,
    })
}

fn speculative_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SpeculativeRecord> {
    Ok(SpeculativeRecord {
        asset_id: row.get(0)?,
        symbol: row.get(1)?,
        price: row.get(2)?,
        previous_price: row.get(3)?,
        circulating_supply: row.get(4)?,
        volatility_estimate: row.get(5)?,
        market_cap: row.get(6)?,
    })
}
