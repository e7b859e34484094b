//! Primary/secondary benchmark orchestration over TCP.
pub mod primary;
pub mod protocol;
pub mod secondary;

pub use primary::{PrimaryOptions, run_primary};
pub use secondary::{SecondaryOptions, run_secondary};

#[cfg(test)]
mod tests;
