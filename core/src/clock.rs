//! Wall-clock access.
//!
//! RULE: No stage reads the platform clock directly. Time enters the
//! engine through a TimeSource handed to the driver, so the sinusoidal
//! trend bias and the interest elapsed-interval math can be pinned in
//! tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub trait TimeSource: Send {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Production clock.
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Test clock: reports a fixed instant until advanced by hand.
/// Clone the handle before boxing it into the engine to keep control.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn at(ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(ms)),
        }
    }

    pub fn advance_ms(&self, delta: i64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set_ms(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
