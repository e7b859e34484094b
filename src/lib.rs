//! Core library for the `cadence` CLI.
//!
//! A primary process turns a benchmark plan into a deterministic schedule of
//! interactions, hands each secondary its share ahead of time, releases all
//! of them at once and gathers per-interaction submit, commit and abort
//! times. Target systems plug in through the [`adapter`] traits.
pub mod adapter;
pub mod args;
pub mod config;
pub mod distributed;
pub mod entry;
pub mod error;
pub mod results;
pub mod schedule;
pub mod workload;

mod system;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;

#[cfg(test)]
mod test_support;
