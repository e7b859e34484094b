use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::Instant;
use tracing::{error, warn};

use crate::adapter::{InteractionReporter, PreparedInteraction};
use crate::distributed::protocol::InteractionRecord;

use super::warnings::TimingMonitor;

/// A decoded interaction waiting for its turn.
pub(crate) struct PreparedEntry {
    pub(crate) client: usize,
    pub(crate) kind: usize,
    pub(crate) offset: f64,
    /// Arrival order, used to keep equal offsets stable.
    pub(crate) sequence: usize,
    pub(crate) prepared: Box<dyn PreparedInteraction>,
}

/// Where an interaction is in its lifecycle, with the times (seconds since
/// start) at which it got there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Phase {
    Pending,
    Submitted { submit: f64 },
    Committed { submit: f64, commit: f64 },
    Aborted { submit: Option<f64>, abort: f64 },
}

impl Phase {
    fn submit(self, at: f64) -> Result<Self, &'static str> {
        match self {
            Phase::Pending => Ok(Phase::Submitted { submit: at }),
            Phase::Submitted { .. } => Err("submitted twice"),
            Phase::Committed { .. } => Err("submitted after commit"),
            Phase::Aborted { .. } => Err("submitted after abort"),
        }
    }

    fn commit(self, at: f64) -> Result<Self, &'static str> {
        match self {
            Phase::Submitted { submit } => Ok(Phase::Committed { submit, commit: at }),
            Phase::Pending => Err("committed before submit"),
            Phase::Committed { .. } => Err("committed twice"),
            Phase::Aborted { .. } => Err("committed after abort"),
        }
    }

    fn abort(self, at: f64) -> Result<Self, &'static str> {
        match self {
            Phase::Pending => Ok(Phase::Aborted {
                submit: None,
                abort: at,
            }),
            Phase::Submitted { submit } => Ok(Phase::Aborted {
                submit: Some(submit),
                abort: at,
            }),
            Phase::Committed { .. } => Err("aborted after commit"),
            Phase::Aborted { .. } => Err("aborted twice"),
        }
    }

    const fn submit_time(self) -> Option<f64> {
        match self {
            Phase::Pending => None,
            Phase::Submitted { submit } | Phase::Committed { submit, .. } => Some(submit),
            Phase::Aborted { submit, .. } => submit,
        }
    }

    const fn commit_time(self) -> Option<f64> {
        match self {
            Phase::Committed { commit, .. } => Some(commit),
            Phase::Pending | Phase::Submitted { .. } | Phase::Aborted { .. } => None,
        }
    }

    const fn abort_time(self) -> Option<f64> {
        match self {
            Phase::Aborted { abort, .. } => Some(abort),
            Phase::Pending | Phase::Submitted { .. } | Phase::Committed { .. } => None,
        }
    }
}

#[derive(Debug)]
struct Lifecycle {
    phase: Phase,
    failed: bool,
}

/// A dispatched interaction and the lifecycle its trigger reports into.
pub(crate) struct TrackedInteraction {
    client: usize,
    kind: usize,
    offset: f64,
    start: Instant,
    prepared: Box<dyn PreparedInteraction>,
    lifecycle: Mutex<Lifecycle>,
    monitor: Arc<TimingMonitor>,
}

impl TrackedInteraction {
    pub(crate) fn new(entry: PreparedEntry, start: Instant, monitor: Arc<TimingMonitor>) -> Self {
        Self {
            client: entry.client,
            kind: entry.kind,
            offset: entry.offset,
            start,
            prepared: entry.prepared,
            lifecycle: Mutex::new(Lifecycle {
                phase: Phase::Pending,
                failed: false,
            }),
            monitor,
        }
    }

    /// Runs the adapter trigger; a failure is recorded, never propagated.
    pub(crate) async fn fire(self: Arc<Self>) {
        if let Err(err) = self.prepared.trigger(self.as_ref()).await {
            error!(
                "interaction of client {} (kind {}) failed: {}",
                self.client, self.kind, err
            );
            self.lock().failed = true;
        }
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub(crate) fn record(&self) -> InteractionRecord {
        let lifecycle = self.lock();
        InteractionRecord {
            client: self.client,
            kind: self.kind,
            submit_time: lifecycle.phase.submit_time(),
            commit_time: lifecycle.phase.commit_time(),
            abort_time: lifecycle.phase.abort_time(),
            has_error: lifecycle.failed,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(
        &self,
        event: &'static str,
        apply: impl FnOnce(Phase, f64) -> Result<Phase, &'static str>,
    ) -> Option<f64> {
        let now = self.start.elapsed().as_secs_f64();
        let mut lifecycle = self.lock();
        match apply(lifecycle.phase, now) {
            Ok(phase) => {
                lifecycle.phase = phase;
                Some(now)
            }
            Err(anomaly) => {
                drop(lifecycle);
                warn!(
                    "ignoring {} of client {} interaction at {:.3}s: {}",
                    event, self.client, self.offset, anomaly
                );
                None
            }
        }
    }
}

impl InteractionReporter for TrackedInteraction {
    fn report_submit(&self) {
        if let Some(submit) = self.transition("submit", Phase::submit) {
            self.monitor
                .check_delay(submit - self.offset, Instant::now());
        }
    }

    fn report_commit(&self) {
        let _committed = self.transition("commit", Phase::commit);
    }

    fn report_abort(&self) {
        let _aborted = self.transition("abort", Phase::abort);
    }
}
