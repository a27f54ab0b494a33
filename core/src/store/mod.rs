//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Stages call store methods — they never execute SQL directly.

use crate::{
    error::{EngineError, EngineResult},
    event::TickRecord,
    types::{Money, Tick},
};
mod debt;
mod listing;
mod market;
use rusqlite::{params, Connection};

pub struct MarketStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl MarketStore {
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    /// For file-based databases, this opens the same file.
    pub fn reopen(&self) -> EngineResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_market.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_debt.sql"))?;
        Ok(())
    }

    // ── Tick records ───────────────────────────────────────────

    /// The highest recorded tick number, or 0 before the first tick.
    pub fn last_tick_number(&self) -> EngineResult<Tick> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(tick_number) FROM tick_record",
            [],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) as Tick)
    }

    /// Append one tick record. A duplicate tick number means a second
    /// driver ran the same tick — surfaced as DuplicateTick, never
    /// silently overwritten.
    pub fn insert_tick_record(&self, record: &TickRecord) -> EngineResult<()> {
        let result = self.conn.execute(
            "INSERT INTO tick_record (
                tick_number, timestamp_ms, purchase_events,
                equity_price_events, speculative_price_events, total_budget_spent
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.tick_number as i64,
                record.timestamp_ms,
                serde_json::to_string(&record.purchase_events)?,
                serde_json::to_string(&record.equity_price_events)?,
                serde_json::to_string(&record.speculative_price_events)?,
                record.total_budget_spent,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(EngineError::DuplicateTick {
                    tick: record.tick_number,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn tick_record(&self, tick: Tick) -> EngineResult<Option<TickRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT tick_number, timestamp_ms, purchase_events,
                    equity_price_events, speculative_price_events, total_budget_spent
             FROM tick_record WHERE tick_number = ?1",
        )?;
        let mut rows = stmt.query_map(params![tick as i64], tick_record_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Most recent records first — the shape the game's history view reads.
    pub fn latest_tick_records(&self, count: usize) -> EngineResult<Vec<TickRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT tick_number, timestamp_ms, purchase_events,
                    equity_price_events, speculative_price_events, total_budget_spent
             FROM tick_record ORDER BY tick_number DESC LIMIT ?1",
        )?;
        let records = stmt
            .query_map(params![count as i64], tick_record_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn tick_record_count(&self) -> EngineResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM tick_record", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // ── Price history ──────────────────────────────────────────

    pub fn append_price_history(
        &self,
        asset_kind: &str,
        asset_id: &str,
        tick: Tick,
        price: Money,
        timestamp_ms: i64,
    ) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO price_history (asset_kind, asset_id, tick_number, price, timestamp_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![asset_kind, asset_id, tick as i64, price, timestamp_ms],
        )?;
        Ok(())
    }

    pub fn price_history_count(&self, asset_id: &str) -> EngineResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM price_history WHERE asset_id = ?1",
                params![asset_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn tick_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TickRecord> {
    let purchase_json: String = row.get(2)?;
    let equity_json: String = row.get(3)?;
    let speculative_json: String = row.get(4)?;
    Ok(TickRecord {
        tick_number: row.get::<_, i64>(0)? as Tick,
        timestamp_ms: row.get(1)?,
        purchase_events: serde_json::from_str(&purchase_json).unwrap_or_default(),
        equity_price_events: serde_json::from_str(&equity_json).unwrap_or_default(),
        speculative_price_events: serde_json::from_str(&speculative_json).unwrap_or_default(),
        total_budget_spent: row.get(5)?,
    })
}
