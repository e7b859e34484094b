use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Load time {time} must be finite and >= 0.")]
    InvalidTime { time: f64 },
    #[error("Load rate {rate} at time {time} must be finite and within 0..=1e9.")]
    InvalidRate { time: f64, rate: f64 },
    #[error("Load rate {rate} at time {time} is too fine for the time's float precision.")]
    RateTooFine { time: f64, rate: f64 },
    #[error("Invalid load time key '{key}'.")]
    InvalidTimeKey { key: String },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
