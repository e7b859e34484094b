mod dispatch;
mod interaction;
mod prepare;
mod runtime;
mod warnings;


pub use runtime::{SecondaryOptions, SecondaryState, SessionSummary, run_secondary};
