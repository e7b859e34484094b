use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{AppError, AppResult, ConfigError};

use super::tree::BenchmarkResult;

#[must_use]
pub fn default_results_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(format!("results-{}.json", stamp))
}

/// Writes `result` as pretty JSON to `path`, or to a timestamped file in the
/// working directory.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub fn write_results(result: &BenchmarkResult, path: Option<&Path>) -> AppResult<PathBuf> {
    let path = path.map_or_else(default_results_path, Path::to_path_buf);
    let write_error = |source| {
        AppError::config(ConfigError::WriteResults {
            path: path.clone(),
            source,
        })
    };
    let file = File::create(&path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.write_all(b"\n").map_err(write_error)?;
    writer.flush().map_err(write_error)?;
    info!("Results written to {}", path.display());
    Ok(path)
}
