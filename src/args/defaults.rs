use std::thread::available_parallelism;

pub(crate) const DEFAULT_LISTEN: &str = "0.0.0.0:8323";
pub(crate) const DEFAULT_MAX_DELAY_SECS: f64 = 1.0;
pub(crate) const DEFAULT_MAX_SKEW_SECS: f64 = 1.0;
pub(crate) const DEFAULT_DRAIN_TIMEOUT_SECS: &str = "30";

/// Four decode tasks per available core.
pub(crate) fn default_decode_concurrency() -> usize {
    available_parallelism()
        .map_or(1, std::num::NonZeroUsize::get)
        .saturating_mul(4)
}
