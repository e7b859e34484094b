use crate::error::ScheduleError;

/// Highest accepted rate in events per second.
pub const MAX_RATE: f64 = 1_000_000_000.0;

/// A validated mapping from time (seconds) to target rate (events/second).
///
/// The rate set at a key holds until the next key; the last key marks the end
/// of the curve. Without a key at `0` the rate before the first key is zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadCurve {
    points: Vec<(f64, f64)>,
}

impl LoadCurve {
    /// Builds a curve from `(time, rate)` pairs in any order.
    ///
    /// When a time appears more than once the last pair wins.
    ///
    /// # Errors
    ///
    /// Returns an error when a time is negative or not finite, or when a rate
    /// is negative, not finite or above [`MAX_RATE`]. A rate whose spacing is
    /// below the float resolution of its segment is rejected as well.
    pub fn new<I>(points: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut sorted = Vec::new();
        for (time, rate) in points {
            if !time.is_finite() || time < 0.0 {
                return Err(ScheduleError::InvalidTime { time });
            }
            if !rate.is_finite() || !(0.0..=MAX_RATE).contains(&rate) {
                return Err(ScheduleError::InvalidRate { time, rate });
            }
            // Folds -0.0 into 0.0 so both sort as the same key.
            sorted.push((time + 0.0, rate));
        }
        sorted.sort_by(|left, right| left.0.total_cmp(&right.0));

        let mut deduped: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
        for point in sorted {
            if let Some(last) = deduped.last_mut()
                && last.0.total_cmp(&point.0).is_eq()
            {
                *last = point;
            } else {
                deduped.push(point);
            }
        }
        for pair in deduped.windows(2) {
            if let [(start, rate), (end, _)] = pair
                && *rate > 0.0
                && end > start
                && !advances_at(*end, 1.0 / rate)
            {
                return Err(ScheduleError::RateTooFine {
                    time: *start,
                    rate: *rate,
                });
            }
        }
        Ok(Self { points: deduped })
    }

    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Time of the last key, or `0` for an empty curve.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.points.last().map_or(0.0, |point| point.0)
    }

    /// Lazily yields the fire times of this curve.
    #[must_use]
    pub fn fire_times(&self) -> FireTimes {
        FireTimes::new(self.points.clone())
    }
}

impl IntoIterator for LoadCurve {
    type Item = f64;
    type IntoIter = FireTimes;

    fn into_iter(self) -> FireTimes {
        FireTimes::new(self.points)
    }
}

/// Whether adding `tick` moves every clock up to `end` forward.
fn advances_at(end: f64, tick: f64) -> bool {
    end + tick * 0.5 > end
}

/// Collects every fire time of `curve`.
#[must_use]
pub fn flatten_loads(curve: &LoadCurve) -> Vec<f64> {
    curve.fire_times().collect()
}

/// Deterministic fire times of a piecewise-constant rate.
///
/// Partial progress toward the next event is carried across rate changes, so
/// a rate change in the middle of an interval shortens or stretches that
/// interval instead of restarting it.
#[derive(Debug, Clone)]
pub struct FireTimes {
    points: std::vec::IntoIter<(f64, f64)>,
    key: f64,
    rate: f64,
    segment: Option<Segment>,
    done: f64,
    last: f64,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    clock: f64,
    end: f64,
    tick: f64,
}

impl FireTimes {
    fn new(points: Vec<(f64, f64)>) -> Self {
        Self {
            points: points.into_iter(),
            key: 0.0,
            rate: 0.0,
            segment: None,
            done: 0.0,
            last: f64::NEG_INFINITY,
        }
    }
}

impl Iterator for FireTimes {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        loop {
            if let Some(segment) = self.segment.as_mut() {
                let wait = (1.0 - self.done) * segment.tick;
                let at = segment.clock + wait;
                if at <= self.last {
                    // No float progress left in this segment.
                    self.segment = None;
                    continue;
                }
                if at <= segment.end {
                    self.done = 0.0;
                    self.last = at;
                    segment.clock = at;
                    return Some(at);
                }
                self.done += (segment.end - segment.clock) / segment.tick;
                self.segment = None;
            }

            let (time, rate) = self.points.next()?;
            if time > self.key && self.rate > 0.0 {
                self.segment = Some(Segment {
                    clock: self.key,
                    end: time,
                    tick: 1.0 / self.rate,
                });
            }
            self.key = time;
            self.rate = rate;
        }
    }
}
