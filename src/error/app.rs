use thiserror::Error;

use super::{
    AdapterError, ConfigError, DistributedError, ScheduleError, ValidationError, WireError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Join error: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),
    #[error("Distributed error: {0}")]
    Distributed(#[from] DistributedError),
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn wire<E>(error: E) -> Self
    where
        E: Into<WireError>,
    {
        error.into().into()
    }

    pub fn distributed<E>(error: E) -> Self
    where
        E: Into<DistributedError>,
    {
        error.into().into()
    }

    pub fn adapter<E>(error: E) -> Self
    where
        E: Into<AdapterError>,
    {
        error.into().into()
    }

    pub fn schedule<E>(error: E) -> Self
    where
        E: Into<ScheduleError>,
    {
        error.into().into()
    }
}
