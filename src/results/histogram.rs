use hdrhistogram::Histogram;

/// Commit latencies in microseconds.
#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, String> {
        let hist = Histogram::<u64>::new(3)
            .map_err(|err| format!("Failed to create histogram: {}", err))?;
        Ok(Self { hist })
    }

    /// Record a latency given in seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record_secs(&mut self, latency: f64) -> Result<(), String> {
        // Float to integer casts saturate.
        let value = (latency.max(0.0) * 1_000_000.0).round() as u64;
        self.hist
            .record(value.max(1))
            .map_err(|err| format!("Failed to record latency: {}", err))
    }

    /// Merge another histogram into this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the merge fails.
    pub fn merge(&mut self, other: &LatencyHistogram) -> Result<(), String> {
        self.hist
            .add(&other.hist)
            .map_err(|err| format!("Failed to merge histogram: {}", err))
    }

    /// p50, p90 and p99 in milliseconds.
    #[must_use]
    pub fn percentiles_ms(&self) -> (f64, f64, f64) {
        if self.count() == 0 {
            return (0.0, 0.0, 0.0);
        }
        (
            micros_to_ms(self.hist.value_at_quantile(0.5)),
            micros_to_ms(self.hist.value_at_quantile(0.9)),
            micros_to_ms(self.hist.value_at_quantile(0.99)),
        )
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}

fn micros_to_ms(value: u64) -> f64 {
    value as f64 / 1_000.0
}
