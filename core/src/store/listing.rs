//! Store methods for storefront listings.

use super::MarketStore;
use crate::{demand::ListingRecord, error::EngineResult, types::Money};
use rusqlite::params;

impl MarketStore {
    pub fn insert_listing(&self, l: &ListingRecord) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO listing (
                listing_id, owner_id, sell_price, unit_cost, stock_on_hand,
                max_units_per_tick, quality_score, units_sold, revenue, active
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                &l.listing_id,
                &l.owner_id,
                l.sell_price,
                l.unit_cost,
                l.stock_on_hand,
                l.max_units_per_tick,
                l.quality_score,
                l.units_sold,
                l.revenue,
                if l.active { 1 } else { 0 },
            ],
        )?;
        Ok(())
    }

    /// Listings the allocator may spend against: active, positively
    /// priced under the cap, with stock available or unlimited.
    pub fn eligible_listings(&self, price_cap: Money) -> EngineResult<Vec<ListingRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT listing_id, owner_id, sell_price, unit_cost, stock_on_hand,
                    max_units_per_tick, quality_score, units_sold, revenue, active
             FROM listing
             WHERE active = 1 AND sell_price > 0 AND sell_price <= ?1
               AND (stock_on_hand IS NULL OR stock_on_hand > 0)",
        )?;
        let rows = stmt.query_map(params![price_cap], listing_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn get_listing(&self, listing_id: &str) -> EngineResult<ListingRecord> {
        self.conn()
            .query_row(
                "SELECT listing_id, owner_id, sell_price, unit_cost, stock_on_hand,
                        max_units_per_tick, quality_score, units_sold, revenue, active
                 FROM listing WHERE listing_id = ?1",
                params![listing_id],
                listing_row,
            )
            .map_err(Into::into)
    }

    /// Commit one accepted purchase: decrement stock (bounded listings
    /// only), bump the sold counter and revenue.
    pub fn record_sale(&self, listing_id: &str, quantity: i64, total: Money) -> EngineResult<()> {
        self.conn().execute(
            "UPDATE listing
             SET stock_on_hand = CASE
                     WHEN stock_on_hand IS NULL THEN NULL
                     ELSE stock_on_hand - ?1
                 END,
                 units_sold = units_sold + ?1,
                 revenue = revenue + ?2
             WHERE listing_id = ?3",
            params![quantity, total, listing_id],
        )?;
        Ok(())
    }
}

fn listing_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ListingRecord> {
    Ok(ListingRecord {
        listing_id: row.get(0)?,
        owner_id: row.get(1)?,
        sell_price: row.get(2)?,
        unit_cost: row.get(3)?,
        stock_on_hand: row.get(4)?,
        max_units_per_tick: row.get(5)?,
        quality_score: row.get(6)?,
        units_sold: row.get(7)?,
        revenue: row.get(8)?,
        active: row.get::<_, i32>(9)? != 0,
    })
}
