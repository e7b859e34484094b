mod adapter;
mod app;
mod config;
mod distributed;
mod schedule;
mod validation;
mod wire;

#[cfg(test)]
mod test_support;

pub use adapter::AdapterError;
pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use distributed::DistributedError;
pub use schedule::ScheduleError;
pub use validation::ValidationError;
pub use wire::{FrameFamily, WireError, WireField};
