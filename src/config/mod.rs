//! Benchmark plan loading and validation.
mod loader;
mod plan;
pub mod types;


pub use loader::load_plan;
pub use plan::{BehaviorPlan, BenchmarkPlan, WorkloadPlan};

#[cfg(test)]
pub(crate) use loader::load_plan_file;
