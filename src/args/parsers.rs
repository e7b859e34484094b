use std::time::Duration;

use super::types::PositiveUsize;
use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

/// Parses a non-negative, finite number of seconds (fractions allowed).
pub(crate) fn parse_seconds(s: &str) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidSeconds {
        value: s.to_owned(),
    };
    let value: f64 = s.trim().parse().map_err(|_err| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

pub(crate) fn parse_seconds_duration(s: &str) -> Result<Duration, ValidationError> {
    let value = parse_seconds(s)?;
    Duration::try_from_secs_f64(value).map_err(|_err| ValidationError::InvalidSeconds {
        value: s.to_owned(),
    })
}

/// Accepts `KEY=VALUE` with a non-empty key; the entry is kept verbatim.
pub(crate) fn parse_env_entry(s: &str) -> Result<String, ValidationError> {
    let has_key = s
        .split_once('=')
        .is_some_and(|(key, _)| !key.trim().is_empty());
    if !has_key {
        return Err(ValidationError::InvalidEnvEntry {
            value: s.to_owned(),
        });
    }
    Ok(s.to_owned())
}
