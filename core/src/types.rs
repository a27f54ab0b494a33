//! Shared primitive types used across the entire engine.

/// A simulation tick. One tick = one scheduled batch advance of the market.
pub type Tick = u64;

/// Money in integer minor currency units. Derived amounts floor, never round.
pub type Money = i64;

/// A stable, unique identifier for any market object.
pub type AssetId = String;
