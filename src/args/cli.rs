use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use super::defaults::{
    DEFAULT_DRAIN_TIMEOUT_SECS, DEFAULT_LISTEN, DEFAULT_MAX_DELAY_SECS, DEFAULT_MAX_SKEW_SECS,
    default_decode_concurrency,
};
use super::parsers::{
    parse_env_entry, parse_positive_usize, parse_seconds, parse_seconds_duration,
};
use super::types::PositiveUsize;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Distributed benchmark harness that replays a precomputed interaction schedule against a target system."
)]
pub struct CadenceArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (overridden by CADENCE_LOG)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Coordinate a benchmark: accept secondaries, prepare, start, collect
    Primary(PrimaryArgs),
    /// Join a primary and run its share of the benchmark
    Secondary(SecondaryArgs),
}

#[derive(Debug, Args, Clone)]
pub struct PrimaryArgs {
    /// Benchmark plan (.toml or .json)
    #[arg(long = "config", short = 'c')]
    pub config: PathBuf,

    /// Number of secondaries to wait for before preparing
    #[arg(long = "secondaries", short = 'n', value_parser = parse_positive_usize)]
    pub secondaries: PositiveUsize,

    /// Address to accept secondaries on
    #[arg(long = "listen", short = 'l', default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Seconds a submit may lag its schedule before warning
    #[arg(long = "max-delay", default_value_t = DEFAULT_MAX_DELAY_SECS, value_parser = parse_seconds)]
    pub max_delay: f64,

    /// Seconds the dispatch loop may fall behind before warning
    #[arg(long = "max-skew", default_value_t = DEFAULT_MAX_SKEW_SECS, value_parser = parse_seconds)]
    pub max_skew: f64,

    /// Master seed for placement and views (defaults to the current time)
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Where to write the JSON results (defaults to results-<timestamp>.json)
    #[arg(long = "output", short = 'o')]
    pub output: Option<PathBuf>,

    /// Extra KEY=VALUE entries handed to the target system
    #[arg(long = "env", short = 'e', value_parser = parse_env_entry)]
    pub env: Vec<String>,
}

#[derive(Debug, Args, Clone)]
pub struct SecondaryArgs {
    /// Address of the primary (host:port)
    #[arg(long = "primary", short = 'p')]
    pub primary: String,

    /// Tag advertised to the primary (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    /// Extra KEY=VALUE entries handed to the target system
    #[arg(long = "env", short = 'e', value_parser = parse_env_entry)]
    pub env: Vec<String>,

    /// Interactions decoded concurrently during preparation (defaults to
    /// four per core)
    #[arg(long = "decode-concurrency", value_parser = parse_positive_usize)]
    pub decode_concurrency: Option<PositiveUsize>,

    /// Seconds to wait for in-flight interactions after the last dispatch
    #[arg(
        long = "drain-timeout",
        default_value = DEFAULT_DRAIN_TIMEOUT_SECS,
        value_parser = parse_seconds_duration
    )]
    pub drain_timeout: Duration,
}

impl SecondaryArgs {
    #[must_use]
    pub fn decode_concurrency(&self) -> usize {
        self.decode_concurrency
            .map_or_else(default_decode_concurrency, PositiveUsize::get)
    }
}
