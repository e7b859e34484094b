use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Invalid {system} parameter '{name}': '{value}'.")]
    InvalidParameter {
        system: &'static str,
        name: &'static str,
        value: String,
    },
    #[error("Invalid interaction payload ({len} bytes).")]
    InvalidPayload { len: usize },
    #[error("Unsupported interaction type '{itype}' for {system}.")]
    UnsupportedInteraction {
        system: &'static str,
        itype: String,
    },
    #[error("Target system '{name}' is already registered.")]
    DuplicateSystem { name: String },
    #[error("Interaction trigger failed: {message}")]
    Trigger { message: String },
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
