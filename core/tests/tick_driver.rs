//! Driver tests — tick numbering, record contents, and the
//! duplicate-tick guard.

use bazaar_core::{
    clock::ManualClock,
    config::EngineConfig,
    demand::ListingRecord,
    engine::TickEngine,
    equity::{EntityRecord, EquityRecord},
    error::EngineError,
    event::TickRecord,
    speculative::SpeculativeRecord,
    store::MarketStore,
};

const T0: i64 = 1_700_000_000_000;

fn engine_on(store: MarketStore, seed: u64) -> TickEngine {
    let clock = ManualClock::at(T0);
    TickEngine::build(EngineConfig::default_test(), store, Box::new(clock), seed)
}

fn new_engine(seed: u64) -> TickEngine {
    let store = MarketStore::in_memory().unwrap();
    store.migrate().unwrap();
    engine_on(store, seed)
}

fn seed_market(engine: &TickEngine) {
    engine
        .store()
        .insert_entity(&EntityRecord {
            entity_id: "ent-1".to_string(),
            name: "Issuer One".to_string(),
            balance: 0,
            is_listed: true,
            annual_revenue_estimate: 10_000_000,
            fundamental_multiple: 1.0,
            growth_rate_pct: 0.0,
            sentiment_score: 0.0,
            volatility_estimate: 0.4,
            market_cap: 0,
        })
        .unwrap();
    engine
        .store()
        .insert_listing(&ListingRecord {
            listing_id: "lst-1".to_string(),
            owner_id: "ent-1".to_string(),
            sell_price: 1_000,
            unit_cost: 500,
            stock_on_hand: Some(100),
            max_units_per_tick: None,
            quality_score: 0.7,
            units_sold: 0,
            revenue: 0,
            active: true,
        })
        .unwrap();
    engine
        .store()
        .insert_equity(&EquityRecord {
            instrument_id: "eq-1".to_string(),
            entity_id: "ent-1".to_string(),
            price: 10_000,
            previous_price: 10_000,
            units_outstanding: 1_000,
            market_cap: 10_000_000,
        })
        .unwrap();
    engine
        .store()
        .insert_speculative(&SpeculativeRecord {
            asset_id: "tok-1".to_string(),
            symbol: "TOK".to_string(),
            price: 5_000,
            previous_price: 5_000,
            circulating_supply: 1_000_000,
            volatility_estimate: 0.9,
            market_cap: 5_000_000_000,
        })
        .unwrap();
}

/// Sequential single-threaded ticks number 1, 2, 3 — strictly +1, no
/// gaps.
#[test]
fn tick_numbers_increase_by_exactly_one() {
    let mut engine = new_engine(41);

    for expected in 1..=3u64 {
        let summary = engine.run_tick().unwrap();
        assert_eq!(summary.tick_number, expected);
    }
    assert_eq!(engine.store().last_tick_number().unwrap(), 3);
    assert_eq!(engine.store().tick_record_count().unwrap(), 3);
}

/// An empty market still records its tick: empty event arrays, zero
/// spend.
#[test]
fn empty_market_still_writes_a_record() {
    let mut engine = new_engine(42);

    let summary = engine.run_tick().unwrap();
    assert_eq!(summary.purchase_count, 0);
    assert_eq!(summary.equity_update_count, 0);
    assert_eq!(summary.speculative_update_count, 0);

    let record = engine.store().tick_record(1).unwrap().expect("record");
    assert!(record.purchase_events.is_empty());
    assert!(record.equity_price_events.is_empty());
    assert!(record.speculative_price_events.is_empty());
    assert_eq!(record.total_budget_spent, 0);
    assert_eq!(record.timestamp_ms, T0);
}

/// The persisted record and the returned summary describe the same
/// tick.
#[test]
fn record_matches_summary() {
    let mut engine = new_engine(43);
    seed_market(&engine);

    let summary = engine.run_tick().unwrap();
    let record = engine.store().tick_record(1).unwrap().expect("record");

    assert_eq!(record.purchase_events.len(), summary.purchase_count);
    assert_eq!(record.equity_price_events.len(), summary.equity_update_count);
    assert_eq!(
        record.speculative_price_events.len(),
        summary.speculative_update_count
    );
    assert!(record.total_budget_spent <= engine.config().bot_budget);
}

/// Two drivers racing on one store cannot both record the same tick:
/// whoever inserts second gets DuplicateTick instead of silently
/// double-spending the budget.
#[test]
fn duplicate_tick_number_is_rejected() {
    let uri = "file:tick_driver_race?mode=memory&cache=shared";
    let store_a = MarketStore::open(uri).unwrap();
    store_a.migrate().unwrap();
    let store_b = store_a.reopen().unwrap();

    let mut engine = engine_on(store_a, 44);
    let summary = engine.run_tick().unwrap();
    assert_eq!(summary.tick_number, 1);

    // A second driver that read last_tick_number before the insert
    // would try to write the same number.
    let stale = TickRecord::from_events(1, T0, &[]);
    let err = store_b.insert_tick_record(&stale).unwrap_err();
    assert!(
        matches!(err, EngineError::DuplicateTick { tick: 1 }),
        "expected DuplicateTick, got {err:?}"
    );

    // A driver that re-reads proceeds under the next number.
    assert_eq!(store_b.last_tick_number().unwrap(), 1);
    let next = TickRecord::from_events(2, T0, &[]);
    store_b.insert_tick_record(&next).unwrap();
}

/// Records come back newest-first for the history view.
#[test]
fn latest_records_are_ordered_descending() {
    let mut engine = new_engine(45);
    engine.run_ticks(4).unwrap();

    let records = engine.store().latest_tick_records(3).unwrap();
    let numbers: Vec<u64> = records.iter().map(|r| r.tick_number).collect();
    assert_eq!(numbers, vec![4, 3, 2]);
}
