use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{debug, error, warn};

use super::interaction::{PreparedEntry, TrackedInteraction};
use super::warnings::TimingMonitor;

/// Interactions launched by [`dispatch`] and the tasks driving them.
pub(crate) struct Dispatched {
    pub(crate) interactions: Vec<Arc<TrackedInteraction>>,
    pub(crate) tasks: JoinSet<()>,
}

/// Fires each entry of the sorted `schedule` at `start + offset`.
///
/// Triggers run as their own tasks so a slow interaction never holds back
/// the next one. When dispatch is late it does not sleep and reports the
/// skew instead.
pub(crate) async fn dispatch(
    schedule: Vec<PreparedEntry>,
    start: Instant,
    monitor: &Arc<TimingMonitor>,
) -> Dispatched {
    let mut interactions = Vec::with_capacity(schedule.len());
    let mut tasks = JoinSet::new();
    for entry in schedule {
        let target = Duration::try_from_secs_f64(entry.offset)
            .ok()
            .and_then(|offset| start.checked_add(offset))
            .unwrap_or(start);
        let now = Instant::now();
        if target > now {
            sleep_until(target).await;
        } else {
            monitor.check_skew(now.saturating_duration_since(target).as_secs_f64(), now);
        }

        let tracked = Arc::new(TrackedInteraction::new(entry, start, Arc::clone(monitor)));
        tasks.spawn(Arc::clone(&tracked).fire());
        interactions.push(tracked);
    }
    debug!("dispatched {} interactions", interactions.len());
    Dispatched {
        interactions,
        tasks,
    }
}

/// Waits up to `limit` for launched interactions to finish. Tasks still
/// running afterwards are aborted; their interactions keep whatever state
/// they reached.
pub(crate) async fn drain(tasks: &mut JoinSet<()>, limit: Duration) {
    let drained = timeout(limit, async {
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!("interaction task ended abnormally: {}", err);
            }
        }
    })
    .await;
    if drained.is_err() {
        warn!(
            "{} interactions still running after {:?}, reporting partial state",
            tasks.len(),
            limit
        );
        tasks.abort_all();
    }
}
