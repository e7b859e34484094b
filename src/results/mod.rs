//! The result tree collected by the primary, its JSON output and the
//! per-kind summary printed at the end of a run.

mod histogram;
mod output;
mod summary;
mod tree;


pub use histogram::LatencyHistogram;
pub use output::{default_results_path, write_results};
pub use summary::{KindSummary, print_summary, summarize, summary_lines};
pub use tree::{BenchmarkResult, ClientResult, InteractionResult, SecondaryResult};
