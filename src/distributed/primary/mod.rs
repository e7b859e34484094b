//! The primary side: accepts secondaries, generates the schedule through a
//! [`Coordinator`], runs the benchmark and gathers the result tree.
mod accept;
mod coordinator;
mod remote;

#[cfg(test)]
mod tests;

pub use accept::{PrimaryOptions, accept_secondaries, run_primary, serve};
pub use coordinator::{Coordinator, CoordinatorState, Location, ScheduleSink};
