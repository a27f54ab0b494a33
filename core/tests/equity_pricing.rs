//! Equity simulator tests — move bounds, mean reversion, and the
//! fundamental anchor.

use bazaar_core::{
    clock::ManualClock,
    config::EngineConfig,
    engine::TickEngine,
    equity::{EntityRecord, EquityRecord},
    store::MarketStore,
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

fn issuer(id: &str, revenue: i64, listed: bool) -> EntityRecord {
    EntityRecord {
        entity_id: id.to_string(),
        name: format!("issuer-{id}"),
        balance: 0,
        is_listed: listed,
        annual_revenue_estimate: revenue,
        fundamental_multiple: 1.0,
        growth_rate_pct: 0.0,
        sentiment_score: 0.0,
        volatility_estimate: 0.4,
        market_cap: 0,
    }
}

fn share(id: &str, entity: &str, price: i64, units: i64) -> EquityRecord {
    EquityRecord {
        instrument_id: id.to_string(),
        entity_id: entity.to_string(),
        price,
        previous_price: price,
        units_outstanding: units,
        market_cap: price * units,
    }
}

/// Every recorded move stays inside ±30% of the prior price and above
/// the equity price floor.
#[test]
fn moves_stay_within_per_tick_bounds() {
    let (mut engine, clock) = new_engine(11);
    // Fundamental equal to the starting price: 10M revenue / 1,000 units.
    engine
        .store()
        .insert_entity(&issuer("ent-a", 10_000_000, true))
        .unwrap();
    engine
        .store()
        .insert_equity(&share("eq-a", "ent-a", 10_000, 1_000))
        .unwrap();

    let mut last_price = 10_000i64;
    for _ in 0..30 {
        engine.run_tick().unwrap();
        clock.advance_ms(TICK_MS);

        let now = engine.store().get_equity("eq-a").unwrap().price;
        let low = (last_price as f64 * 0.7).floor() as i64;
        let high = (last_price as f64 * 1.3).floor() as i64;
        assert!(
            (low..=high).contains(&now),
            "price {now} outside [{low}, {high}]"
        );
        assert!(now >= 100, "price {now} below floor");
        last_price = now;
    }
}

/// Price 1,000 with fundamental 2,000: the blend pulls upward, and the
/// clamp keeps a single tick at or below 1,300.
#[test]
fn reversion_pulls_toward_fundamental_within_clamp() {
    let (mut engine, _clock) = new_engine(12);
    // Fundamental 2,000 = 2M revenue / 1,000 units.
    engine
        .store()
        .insert_entity(&issuer("ent-b", 2_000_000, true))
        .unwrap();
    engine
        .store()
        .insert_equity(&share("eq-b", "ent-b", 1_000, 1_000))
        .unwrap();

    engine.run_tick().unwrap();

    let price = engine.store().get_equity("eq-b").unwrap().price;
    assert!(price > 1_000, "should move toward the higher fundamental");
    assert!(price <= 1_300, "clamped to +30% per tick");
}

/// A fundamental far above the current price saturates the clamp:
/// exactly +30%, floored.
#[test]
fn clamp_binds_when_fundamental_is_far_above() {
    let (mut engine, _clock) = new_engine(13);
    // Fundamental 100,000 = 100M revenue / 1,000 units.
    engine
        .store()
        .insert_entity(&issuer("ent-c", 100_000_000, true))
        .unwrap();
    engine
        .store()
        .insert_equity(&share("eq-c", "ent-c", 100, 1_000))
        .unwrap();

    engine.run_tick().unwrap();

    let price = engine.store().get_equity("eq-c").unwrap().price;
    assert_eq!(price, 130, "floor(100 × 1.3)");
}

/// A worthless fundamental drags the price down, but never through the
/// configured floor.
#[test]
fn price_floor_holds() {
    let (mut engine, clock) = new_engine(14);
    engine
        .store()
        .insert_entity(&issuer("ent-d", 0, true))
        .unwrap();
    engine
        .store()
        .insert_equity(&share("eq-d", "ent-d", 102, 1_000))
        .unwrap();

    for _ in 0..10 {
        engine.run_tick().unwrap();
        clock.advance_ms(TICK_MS);
        let price = engine.store().get_equity("eq-d").unwrap().price;
        assert!(price >= 100, "price {price} fell through the floor");
    }
    assert_eq!(engine.store().get_equity("eq-d").unwrap().price, 100);
}

/// Market cap follows price on both the instrument and its issuer.
#[test]
fn market_cap_propagates_to_issuer() {
    let (mut engine, _clock) = new_engine(15);
    engine
        .store()
        .insert_entity(&issuer("ent-e", 10_000_000, true))
        .unwrap();
    engine
        .store()
        .insert_equity(&share("eq-e", "ent-e", 10_000, 1_000))
        .unwrap();

    engine.run_tick().unwrap();

    let equity = engine.store().get_equity("eq-e").unwrap();
    assert_eq!(equity.market_cap, equity.price * 1_000);

    let entity = engine.store().get_entity("ent-e").unwrap();
    assert_eq!(entity.market_cap, equity.market_cap);
}

/// Unlisted issuers are not simulated at all.
#[test]
fn unlisted_issuer_is_untouched() {
    let (mut engine, _clock) = new_engine(16);
    engine
        .store()
        .insert_entity(&issuer("ent-f", 10_000_000, false))
        .unwrap();
    engine
        .store()
        .insert_equity(&share("eq-f", "ent-f", 10_000, 1_000))
        .unwrap();

    let summary = engine.run_tick().unwrap();
    assert_eq!(summary.equity_update_count, 0);
    assert_eq!(engine.store().get_equity("eq-f").unwrap().price, 10_000);
}

/// Each applied move records the prior price and appends one history
/// sample per update.
#[test]
fn previous_price_and_history_track_updates() {
    let (mut engine, clock) = new_engine(17);
    engine
        .store()
        .insert_entity(&issuer("ent-g", 10_000_000, true))
        .unwrap();
    engine
        .store()
        .insert_equity(&share("eq-g", "ent-g", 10_000, 1_000))
        .unwrap();

    let mut updates = 0usize;
    let mut before = 10_000i64;
    for tick in 1..=20u64 {
        engine.run_tick().unwrap();
        clock.advance_ms(TICK_MS);

        let record = engine.store().tick_record(tick).unwrap().expect("record");
        if let Some(event) = record.equity_price_events.first() {
            assert_eq!(event.old_price, before);
            let equity = engine.store().get_equity("eq-g").unwrap();
            assert_eq!(equity.previous_price, event.old_price);
            assert_eq!(equity.price, event.new_price);
            updates += 1;
        }
        before = engine.store().get_equity("eq-g").unwrap().price;
    }

    assert!(updates > 0, "expected at least one price move in 20 ticks");
    assert_eq!(
        engine.store().price_history_count("eq-g").unwrap(),
        updates as i64
    );
}
