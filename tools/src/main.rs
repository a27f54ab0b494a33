//! tick-runner: headless driver for the market tick engine.
//!
//! The scheduled path and the admin manual-trigger surface both land
//! here — each invocation advances the market and prints what it did.
//!
//! Usage:
//!   tick-runner --db market.db --ticks 1              (one manual tick)
//!   tick-runner --db market.db --ticks 288 --seed 7   (fast-forward a day)
//!   tick-runner --db market.db --demo                 (seed a demo market)

use anyhow::Result;
use bazaar_core::{
    clock::SystemClock,
    config::EngineConfig,
    demand::ListingRecord,
    engine::{TickEngine, TickSummary},
    equity::{EntityRecord, EquityRecord},
    interest::{DebtRecord, DEBT_STATUS_ACTIVE},
    speculative::SpeculativeRecord,
    store::MarketStore,
};
use std::env;
use uuid::Uuid;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 1u64);
    let demo = args.iter().any(|a| a == "--demo");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config_path = args.windows(2).find(|w| w[0] == "--config").map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default_test(),
    };

    println!("tick-runner");
    println!("  seed:   {seed}");
    println!("  ticks:  {ticks}");
    println!("  db:     {db}");
    println!("  budget: {} minor units/tick", config.bot_budget);
    println!();

    // For :memory: use SQLite shared-memory URI so a reopened handle
    // (if the game process attaches later) sees the same database.
    let db_effective: String = if db == ":memory:" {
        format!("file:tickrun_{}?mode=memory&cache=shared", unix_seconds())
    } else {
        db.to_string()
    };
    let store = MarketStore::open(&db_effective)?;
    store.migrate()?;
    log::debug!("store ready at {db_effective}");

    if demo {
        seed_demo_market(&store)?;
        println!("Seeded demo market.");
    }

    let mut engine = TickEngine::build(config, store, Box::new(SystemClock), seed);

    let mut summaries: Vec<TickSummary> = Vec::new();
    for _ in 0..ticks {
        summaries.push(engine.run_tick()?);
    }

    print_summary(&engine, &summaries)?;
    Ok(())
}

/// A small self-contained market: three issuers, four listings, two
/// equities, one token, one debt. Enough for every stage to have work.
fn seed_demo_market(store: &MarketStore) -> Result<()> {
    let issuers = [
        ("Hearthside Goods", true, 50_000_000, 2.4, 8.0, 0.3, 0.45),
        ("Northgate Metals", true, 120_000_000, 1.8, 3.5, -0.1, 0.30),
        ("Quill & Co", false, 8_000_000, 1.0, 0.0, 0.0, 0.0),
    ];

    let mut entity_ids = Vec::new();
    for (name, listed, revenue, multiple, growth, sentiment, vol) in issuers {
        let entity_id = Uuid::new_v4().to_string();
        store.insert_entity(&EntityRecord {
            entity_id: entity_id.clone(),
            name: name.to_string(),
            balance: 1_000_000,
            is_listed: listed,
            annual_revenue_estimate: revenue,
            fundamental_multiple: multiple,
            growth_rate_pct: growth,
            sentiment_score: sentiment,
            volatility_estimate: vol,
            market_cap: 0,
        })?;
        entity_ids.push(entity_id);
    }

    let listings = [
        (0, 1_500, 900, Some(500), None, 0.8),
        (0, 24_000, 15_000, Some(40), Some(5), 0.9),
        (1, 3_200, 2_000, None, None, 0.6),
        (2, 800, 300, Some(2_000), None, 0.4),
    ];
    for (owner, price, cost, stock, cap, quality) in listings {
        store.insert_listing(&ListingRecord {
            listing_id: Uuid::new_v4().to_string(),
            owner_id: entity_ids[owner].clone(),
            sell_price: price,
            unit_cost: cost,
            stock_on_hand: stock,
            max_units_per_tick: cap,
            quality_score: quality,
            units_sold: 0,
            revenue: 0,
            active: true,
        })?;
    }

    for (owner, price, units) in [(0, 12_000, 10_000), (1, 4_500, 80_000)] {
        store.insert_equity(&EquityRecord {
            instrument_id: Uuid::new_v4().to_string(),
            entity_id: entity_ids[owner].clone(),
            price,
            previous_price: price,
            units_outstanding: units,
            market_cap: price * units,
        })?;
    }

    store.insert_speculative(&SpeculativeRecord {
        asset_id: Uuid::new_v4().to_string(),
        symbol: "GLIM".to_string(),
        price: 730,
        previous_price: 730,
        circulating_supply: 1_000_000,
        volatility_estimate: 0.9,
        market_cap: 730 * 1_000_000,
    })?;

    store.insert_debt(&DebtRecord {
        debt_id: Uuid::new_v4().to_string(),
        debtor_id: entity_ids[2].clone(),
        principal: 2_000_000,
        daily_rate_pct: 4.0,
        remaining_balance: 2_000_000,
        accrued_interest_total: 0,
        last_accrual_ms: 0,
        status: DEBT_STATUS_ACTIVE.to_string(),
    })?;

    Ok(())
}

fn print_summary(engine: &TickEngine, summaries: &[TickSummary]) -> Result<()> {
    let purchases: usize = summaries.iter().map(|s| s.purchase_count).sum();
    let equity_updates: usize = summaries.iter().map(|s| s.equity_update_count).sum();
    let speculative_updates: usize = summaries.iter().map(|s| s.speculative_update_count).sum();

    println!("=== RUN SUMMARY ===");
    println!("  ticks run:           {}", summaries.len());
    if let Some(last) = summaries.last() {
        println!("  final tick:          {}", last.tick_number);
    }
    println!("  purchases:           {purchases}");
    println!("  equity updates:      {equity_updates}");
    println!("  speculative updates: {speculative_updates}");

    println!();
    println!("=== LATEST TICKS ===");
    let records = engine.store().latest_tick_records(5)?;
    if records.is_empty() {
        println!("  (no ticks recorded)");
    }
    for record in &records {
        let when = chrono::DateTime::from_timestamp_millis(record.timestamp_ms)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  #{:<6} {} | purchases: {:<3} spent: {:<10} equity: {:<3} speculative: {}",
            record.tick_number,
            when,
            record.purchase_events.len(),
            record.total_budget_spent,
            record.equity_price_events.len(),
            record.speculative_price_events.len(),
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn unix_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
