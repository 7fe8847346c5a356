//! Best-effort throughput pacing.
//!
//! A once-per-second ticker runs independently of the sender. After every
//! `throughput`-th message the sender waits for the next tick. At most one elapsed
//! tick is remembered; ticks that fire while the sender is busy elsewhere are dropped,
//! so a stalled sender never bursts to catch up. The pacer bounds the rate from above
//! only: it never emits more than roughly `throughput` messages per window, but it
//! does not promise exact spacing.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Length of one pacing window.
pub const PACING_WINDOW: Duration = Duration::from_secs(1);

pub struct ThroughputPacer {
    throughput: u32,
    emitted: u64,
    ticker: Option<Interval>,
}

impl ThroughputPacer {
    /// Create a pacer capped at `throughput` messages per window; 0 disables pacing.
    ///
    /// The first tick fires one window after construction. Must be called within a
    /// tokio runtime when pacing is enabled.
    pub fn new(throughput: u32) -> Self {
        let ticker = (throughput > 0).then(|| {
            let mut ticker = interval_at(Instant::now() + PACING_WINDOW, PACING_WINDOW);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        Self {
            throughput,
            emitted: 0,
            ticker,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ticker.is_some()
    }

    /// Record one emitted message, blocking for the next tick when the window is full.
    pub async fn pace(&mut self) {
        if !self.is_enabled() {
            return;
        }
        self.emitted += 1;
        if self.emitted % u64::from(self.throughput) == 0 {
            self.wait_tick().await;
        }
    }

    /// Block until the next tick. Returns at once if a tick is already pending or
    /// pacing is disabled.
    pub async fn wait_tick(&mut self) {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.tick().await;
        }
    }
}
