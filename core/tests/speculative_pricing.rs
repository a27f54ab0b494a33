//! Speculative-asset simulator tests — pure walk, rails only.

use bazaar_core::{
    clock::ManualClock, config::EngineConfig, engine::TickEngine,
    speculative::SpeculativeRecord, store::MarketStore,
};

const T0: i64 = 1_700_000_000_000;
const TICK_MS: i64 = 300_000;

fn new_engine(seed: u64) -> (TickEngine, ManualClock) {
    let store = MarketStore::in_memory().unwrap();
    store.migrate().unwrap();
    let clock = ManualClock::at(T0);
    let engine = TickEngine::build(
        EngineConfig::default_test(),
        store,
        Box::new(clock.clone()),
        seed,
    );
    (engine, clock)
}

fn token(id: &str, price: i64, supply: i64) -> SpeculativeRecord {
    SpeculativeRecord {
        asset_id: id.to_string(),
        symbol: "TOK".to_string(),
        price,
        previous_price: price,
        circulating_supply: supply,
        volatility_estimate: 0.9,
        market_cap: price * supply,
    }
}

/// Every move stays inside ±30% of the prior price and at or above one
/// minor unit.
#[test]
fn moves_stay_within_per_tick_bounds() {
    let (mut engine, clock) = new_engine(21);
    engine
        .store()
        .insert_speculative(&token("tok-a", 1_000, 1_000_000))
        .unwrap();

    let mut last_price = 1_000i64;
    for _ in 0..30 {
        engine.run_tick().unwrap();
        clock.advance_ms(TICK_MS);

        let now = engine.store().get_speculative("tok-a").unwrap().price;
        let low = (last_price as f64 * 0.7).floor() as i64;
        let high = (last_price as f64 * 1.3).floor() as i64;
        assert!(
            (low..=high).contains(&now),
            "price {now} outside [{low}, {high}]"
        );
        assert!(now >= 1);
        last_price = now;
    }
}

/// At one minor unit the clamp window collapses and the floor holds:
/// the price can never walk to zero.
#[test]
fn floor_holds_at_one_minor_unit() {
    let (mut engine, clock) = new_engine(22);
    engine
        .store()
        .insert_speculative(&token("tok-b", 1, 500))
        .unwrap();

    for _ in 0..10 {
        engine.run_tick().unwrap();
        clock.advance_ms(TICK_MS);
        assert_eq!(engine.store().get_speculative("tok-b").unwrap().price, 1);
    }
}

/// Market cap follows price × circulating supply, and each applied move
/// records the prior price plus one history sample.
#[test]
fn market_cap_previous_price_and_history_track_updates() {
    let (mut engine, clock) = new_engine(23);
    engine
        .store()
        .insert_speculative(&token("tok-c", 50_000, 1_000_000))
        .unwrap();

    let mut updates = 0usize;
    let mut before = 50_000i64;
    for tick in 1..=20u64 {
        engine.run_tick().unwrap();
        clock.advance_ms(TICK_MS);

        let asset = engine.store().get_speculative("tok-c").unwrap();
        assert_eq!(asset.market_cap, asset.price * 1_000_000);

        let record = engine.store().tick_record(tick).unwrap().expect("record");
        if let Some(event) = record.speculative_price_events.first() {
            assert_eq!(event.old_price, before);
            assert_eq!(asset.previous_price, event.old_price);
            assert_eq!(asset.price, event.new_price);
            updates += 1;
        }
        before = asset.price;
    }

    assert!(updates > 0, "expected at least one price move in 20 ticks");
    assert_eq!(
        engine.store().price_history_count("tok-c").unwrap(),
        updates as i64
    );
}

#[test]
fn no_assets_is_an_empty_result_not_an_error() {
    let (mut engine, _clock) = new_engine(24);
    let summary = engine.run_tick().unwrap();
    assert_eq!(summary.speculative_update_count, 0);
}
