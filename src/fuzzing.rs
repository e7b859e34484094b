//! Entry points for the `fuzz/` targets.
use std::path::Path;

use crate::distributed::protocol::{
    Frame, PrepareMessage, PrimaryParameters, ResultMessage, SecondaryParameters, StartMessage,
};
use crate::error::{AppError, AppResult};
use crate::schedule::{LoadCurve, flatten_loads};

fn decode_one<F>(input: &[u8]) -> AppResult<F>
where
    F: Frame,
{
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let mut reader = input;
    runtime
        .block_on(F::decode(&mut reader))
        .map_err(AppError::wire)
}

/// Decodes one frame and checks that its encoding is canonical: decoding and
/// encoding it again yields the same bytes. Absent times and error flags are
/// normalized, so the first encoding may differ from `input`.
fn roundtrip<F>(input: &[u8]) -> AppResult<F>
where
    F: Frame,
{
    let frame = decode_one::<F>(input)?;
    let mut encoded = Vec::new();
    frame.encode(&mut encoded).map_err(AppError::wire)?;
    let again = decode_one::<F>(&encoded)?;
    let mut reencoded = Vec::new();
    again.encode(&mut reencoded).map_err(AppError::wire)?;
    debug_assert!(reencoded == encoded);
    Ok(frame)
}

/// Decodes a Prepare frame.
///
/// # Errors
///
/// Returns an error when the bytes are not a valid Prepare frame.
pub fn decode_prepare_input(input: &[u8]) -> AppResult<()> {
    roundtrip::<PrepareMessage>(input).map(|_| ())
}

/// Decodes a Result frame.
///
/// # Errors
///
/// Returns an error when the bytes are not a valid Result frame.
pub fn decode_result_input(input: &[u8]) -> AppResult<()> {
    roundtrip::<ResultMessage>(input).map(|_| ())
}

/// Decodes any of the handshake frames.
///
/// # Errors
///
/// Returns an error when the bytes match none of them.
pub fn decode_handshake_input(input: &[u8]) -> AppResult<()> {
    let primary = decode_one::<PrimaryParameters>(input).map(|_| ());
    let secondary = decode_one::<SecondaryParameters>(input).map(|_| ());
    let start = decode_one::<StartMessage>(input).map(|_| ());
    primary.or(secondary).or(start)
}

/// Builds a load curve from `points` and flattens it, checking the output is
/// strictly increasing and within the curve.
///
/// # Errors
///
/// Returns an error when the points are not a valid curve.
pub fn flatten_loads_input(points: &[(f64, f64)]) -> AppResult<usize> {
    let curve = LoadCurve::new(points.iter().copied()).map_err(AppError::schedule)?;
    let times = flatten_loads(&curve);
    debug_assert!(times.windows(2).all(|pair| matches!(pair, [a, b] if a < b)));
    debug_assert!(times.iter().all(|time| *time <= curve.end()));
    Ok(times.len())
}

/// Loads a plan file from disk to exercise extension handling and validation.
///
/// # Errors
///
/// Returns an error when the plan cannot be read, parsed or validated.
pub fn load_plan_input(path: &Path) -> AppResult<()> {
    crate::config::load_plan(path).map(|_| ())
}
