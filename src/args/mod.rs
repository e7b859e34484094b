//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;


pub use cli::{CadenceArgs, Command, PrimaryArgs, SecondaryArgs};
pub use types::PositiveUsize;
