use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError};

use super::plan::BenchmarkPlan;
use super::types::PlanFile;

/// Loads and validates a benchmark plan.
///
/// # Errors
///
/// Returns an error when the file cannot be read, parsed or validated.
pub fn load_plan(path: &Path) -> AppResult<BenchmarkPlan> {
    load_plan_file(path)?.into_plan()
}

pub(crate) fn load_plan_file(path: &Path) -> AppResult<PlanFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}
