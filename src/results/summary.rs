use std::collections::BTreeMap;

use tracing::warn;

use super::histogram::LatencyHistogram;
use super::tree::{BenchmarkResult, InteractionResult};

/// Label of the summary row covering every kind.
const ALL_KINDS: &str = "all";

#[derive(Debug, Clone, PartialEq)]
pub struct KindSummary {
    pub kind: String,
    pub interactions: u64,
    pub submitted: u64,
    pub committed: u64,
    pub aborted: u64,
    pub errors: u64,
    /// Commits per second between the first submit and the last commit.
    pub throughput: f64,
    pub p50_ms: f64,
    pub p90_ms: f64,
    pub p99_ms: f64,
}

#[derive(Default)]
struct KindStats {
    interactions: u64,
    submitted: u64,
    committed: u64,
    aborted: u64,
    errors: u64,
    first_submit: Option<f64>,
    last_commit: Option<f64>,
    histogram: Option<LatencyHistogram>,
}

impl KindStats {
    fn new() -> Self {
        let histogram = LatencyHistogram::new()
            .inspect_err(|err| warn!("{}", err))
            .ok();
        Self {
            histogram,
            ..Self::default()
        }
    }

    fn add(&mut self, interaction: &InteractionResult) {
        self.interactions = self.interactions.saturating_add(1);
        if let Some(submit) = interaction.submit_time {
            self.submitted = self.submitted.saturating_add(1);
            self.first_submit = Some(self.first_submit.map_or(submit, |first| first.min(submit)));
        }
        if let Some(commit) = interaction.commit_time {
            self.committed = self.committed.saturating_add(1);
            self.last_commit = Some(self.last_commit.map_or(commit, |last| last.max(commit)));
        }
        if interaction.abort_time.is_some() {
            self.aborted = self.aborted.saturating_add(1);
        }
        if interaction.has_error {
            self.errors = self.errors.saturating_add(1);
        }
        if let (Some(latency), Some(histogram)) = (interaction.latency(), self.histogram.as_mut())
            && let Err(err) = histogram.record_secs(latency)
        {
            warn!("{}", err);
        }
    }

    fn absorb(&mut self, other: &KindStats) {
        self.interactions = self.interactions.saturating_add(other.interactions);
        self.submitted = self.submitted.saturating_add(other.submitted);
        self.committed = self.committed.saturating_add(other.committed);
        self.aborted = self.aborted.saturating_add(other.aborted);
        self.errors = self.errors.saturating_add(other.errors);
        self.first_submit = min_option(self.first_submit, other.first_submit);
        self.last_commit = max_option(self.last_commit, other.last_commit);
        if let (Some(histogram), Some(other_histogram)) =
            (self.histogram.as_mut(), other.histogram.as_ref())
            && let Err(err) = histogram.merge(other_histogram)
        {
            warn!("{}", err);
        }
    }

    fn finish(&self, kind: &str) -> KindSummary {
        let throughput = match (self.first_submit, self.last_commit) {
            (Some(first), Some(last)) if last > first => self.committed as f64 / (last - first),
            _ => 0.0,
        };
        let (p50_ms, p90_ms, p99_ms) = self
            .histogram
            .as_ref()
            .map_or((0.0, 0.0, 0.0), LatencyHistogram::percentiles_ms);
        KindSummary {
            kind: kind.to_owned(),
            interactions: self.interactions,
            submitted: self.submitted,
            committed: self.committed,
            aborted: self.aborted,
            errors: self.errors,
            throughput,
            p50_ms,
            p90_ms,
            p99_ms,
        }
    }
}

fn min_option(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(left), Some(right)) => Some(left.min(right)),
        (value, None) | (None, value) => value,
    }
}

fn max_option(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(left), Some(right)) => Some(left.max(right)),
        (value, None) | (None, value) => value,
    }
}

/// One row per interaction kind, in name order, followed by a row for all
/// kinds when there is more than one.
#[must_use]
pub fn summarize(result: &BenchmarkResult) -> Vec<KindSummary> {
    let mut per_kind: BTreeMap<&str, KindStats> = BTreeMap::new();
    for (_, interaction) in result.interactions() {
        per_kind
            .entry(interaction.kind.as_str())
            .or_insert_with(KindStats::new)
            .add(interaction);
    }

    let mut rows: Vec<KindSummary> = per_kind
        .iter()
        .map(|(kind, stats)| stats.finish(kind))
        .collect();
    if per_kind.len() > 1 {
        let mut all = KindStats::new();
        for stats in per_kind.values() {
            all.absorb(stats);
        }
        rows.push(all.finish(ALL_KINDS));
    }
    rows
}

#[must_use]
pub fn summary_lines(rows: &[KindSummary]) -> Vec<String> {
    let mut lines = Vec::with_capacity(rows.len().saturating_add(1));
    if rows.is_empty() {
        lines.push("No interactions were recorded.".to_owned());
        return lines;
    }
    for row in rows {
        lines.push(format!(
            "{}: interactions={} submitted={} committed={} aborted={} errors={} \
             throughput={:.2}/s latency p50={:.3}ms p90={:.3}ms p99={:.3}ms",
            row.kind,
            row.interactions,
            row.submitted,
            row.committed,
            row.aborted,
            row.errors,
            row.throughput,
            row.p50_ms,
            row.p90_ms,
            row.p99_ms
        ));
    }
    lines
}

pub fn print_summary(rows: &[KindSummary]) {
    for line in summary_lines(rows) {
        println!("{}", line);
    }
}
