//! Turns a benchmark plan into clients and a globally time-ordered stream of
//! prepared interactions.
mod generate;

#[cfg(test)]
mod tests;

pub use generate::{GenerationSummary, generate};
