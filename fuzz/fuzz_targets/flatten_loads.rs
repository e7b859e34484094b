#![no_main]

use libfuzzer_sys::fuzz_target;

/// Largest curve span explored, so event counts stay bounded.
const MAX_TIME: f64 = 60.0;
const MAX_RATE: f64 = 500.0;

fuzz_target!(|data: &[u8]| {
    let points: Vec<(f64, f64)> = data
        .chunks_exact(4)
        .take(16)
        .map(|chunk| {
            let time = f64::from(u16::from_le_bytes([chunk[0], chunk[1]])) / 65535.0 * MAX_TIME;
            let rate = f64::from(u16::from_le_bytes([chunk[2], chunk[3]])) / 65535.0 * MAX_RATE;
            (time, rate)
        })
        .collect();

    if let Ok(count) = cadence::fuzzing::flatten_loads_input(&points) {
        debug_assert!(count as f64 <= MAX_TIME * MAX_RATE + 1.0);
    }
});
