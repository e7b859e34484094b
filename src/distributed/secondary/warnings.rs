use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

/// Minimum spacing between two warnings of the same kind.
pub(crate) const WARNING_COOLDOWN: Duration = Duration::from_secs(1);

/// Lets at most one event through per cooldown window.
#[derive(Debug)]
pub(crate) struct WarningLimiter {
    cooldown: Duration,
    last: Mutex<Option<Instant>>,
}

impl WarningLimiter {
    pub(crate) const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: Mutex::new(None),
        }
    }

    pub(crate) fn allow_at(&self, now: Instant) -> bool {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        match *last {
            Some(previous) if now.saturating_duration_since(previous) < self.cooldown => false,
            Some(_) | None => {
                *last = Some(now);
                true
            }
        }
    }
}

/// Thresholds and limiters for the two timing diagnostics of a run.
#[derive(Debug)]
pub(crate) struct TimingMonitor {
    max_skew: f64,
    max_delay: f64,
    skew: WarningLimiter,
    delay: WarningLimiter,
}

impl TimingMonitor {
    pub(crate) const fn new(max_skew: f64, max_delay: f64) -> Self {
        Self {
            max_skew,
            max_delay,
            skew: WarningLimiter::new(WARNING_COOLDOWN),
            delay: WarningLimiter::new(WARNING_COOLDOWN),
        }
    }

    /// Reports that dispatch fell `behind` seconds behind the schedule.
    /// Returns whether a warning was emitted.
    pub(crate) fn check_skew(&self, behind: f64, now: Instant) -> bool {
        if behind < self.max_skew || !self.skew.allow_at(now) {
            return false;
        }
        warn!("dispatch is {:.3}s behind schedule", behind);
        true
    }

    /// Reports an interaction submitted `delay` seconds after its offset.
    /// Returns whether a warning was emitted.
    pub(crate) fn check_delay(&self, delay: f64, now: Instant) -> bool {
        if delay < self.max_delay || !self.delay.allow_at(now) {
            return false;
        }
        warn!("interaction submitted {:.3}s late", delay);
        true
    }
}
