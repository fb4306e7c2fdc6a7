//! Fixed-interval poll scheduler for Chain Gardens.
//!
//! Drives the garden refresh loop: one tick every `interval` (30 s by
//! default), the first one immediately, with a small set of
//! success/failure counters.
//!
//! # Integration
//!
//! The scheduler sits inside a poller task's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = &mut shutdown_rx => break,
//!         _ = scheduler.wait_for_tick() => {
//!             match load().await {
//!                 Ok(_) => scheduler.record_success(),
//!                 Err(_) => scheduler.record_failure(),
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! All timing uses the Tokio clock, so tests can pause and advance time.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default refresh interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// Full configuration for the poll scheduler.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    /// Fire the first tick right away instead of after one interval.
    pub immediate: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            immediate: true,
        }
    }
}

impl PollConfig {
    /// Shortest interval the scheduler accepts.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

    /// A config for a specific interval with sensible defaults.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Same as [`with_interval`](Self::with_interval), in milliseconds.
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self::with_interval(Duration::from_millis(interval_ms))
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`PollScheduler::new`]. An interval below
    /// [`Self::MIN_INTERVAL`] would hammer the backend, so it is raised.
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                "poll interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`PollScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct PollTick {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Deadlines dropped because the previous poll overran them.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Counters describing how polling has gone so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollMetrics {
    pub total_ticks: u64,
    pub total_failures: u64,
    /// Failures since the last success.
    pub consecutive_failures: u64,
    pub total_skipped: u64,
    /// Tick number of the most recent successful poll.
    pub last_success_tick: Option<u64>,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval poll scheduler.
///
/// Deadlines stay on the original cadence: a poll that overruns one or
/// more deadlines drops them instead of firing a burst of catch-up ticks.
pub struct PollScheduler {
    config: PollConfig,
    tick_count: u64,
    /// When the next tick should fire.
    next_tick: Instant,
    metrics: PollMetrics,
}

impl PollScheduler {
    pub fn new(config: PollConfig) -> Self {
        let config = config.validated();
        let now = Instant::now();
        let next_tick = if config.immediate {
            now
        } else {
            now + config.interval
        };

        debug!(
            interval_ms = config.interval.as_millis() as u64,
            immediate = config.immediate,
            "poll scheduler created"
        );

        Self {
            config,
            tick_count: 0,
            next_tick,
            metrics: PollMetrics::default(),
        }
    }

    /// A scheduler for a specific interval with default settings.
    pub fn with_interval(interval: Duration) -> Self {
        Self::new(PollConfig::with_interval(interval))
    }

    /// Wait until the next tick is due.
    pub async fn wait_for_tick(&mut self) -> PollTick {
        let due = self.next_tick;
        time::sleep_until(due).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(due);
        let (ticks_skipped, next_tick) = next_on_cadence(due, late_by, self.config.interval);
        if ticks_skipped > 0 {
            warn!(
                tick = self.tick_count,
                skipped = ticks_skipped,
                late_ms = late_by.as_millis() as u64,
                "poll tick late, skipping missed deadlines"
            );
        }
        self.next_tick = next_tick;

        self.metrics.total_ticks += 1;
        self.metrics.total_skipped += ticks_skipped;
        trace!(tick = self.tick_count, "poll tick fired");

        PollTick {
            tick: self.tick_count,
            ticks_skipped,
        }
    }

    /// Record that the poll for the current tick succeeded.
    pub fn record_success(&mut self) {
        if self.metrics.consecutive_failures > 0 {
            debug!(
                after_failures = self.metrics.consecutive_failures,
                "polling recovered"
            );
        }
        self.metrics.consecutive_failures = 0;
        self.metrics.last_success_tick = Some(self.tick_count);
    }

    /// Record that the poll for the current tick failed.
    pub fn record_failure(&mut self) {
        self.metrics.total_failures += 1;
        self.metrics.consecutive_failures += 1;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn metrics(&self) -> &PollMetrics {
        &self.metrics
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// When the next tick is due.
    pub fn next_deadline(&self) -> Instant {
        self.next_tick
    }
}

/// Deadlines missed by `late_by`, and the first deadline after `due`
/// that hasn't passed yet. Whole intervals only.
fn next_on_cadence(due: Instant, late_by: Duration, interval: Duration) -> (u64, Instant) {
    let step = interval.as_nanos().max(1);
    let missed = late_by.as_nanos() / step;
    let offset = missed.saturating_add(1).saturating_mul(step);
    let offset = Duration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX));
    let skipped = u64::try_from(missed).unwrap_or(u64::MAX);
    (skipped, due + offset)
}
