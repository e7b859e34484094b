use thiserror::Error;

/// Message family a frame belongs to, used to qualify decode errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameFamily {
    #[error("parameters")]
    Parameters,
    #[error("prepare")]
    Prepare,
    #[error("start")]
    Start,
    #[error("result")]
    Result,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WireField {
    #[error("system name")]
    SystemName,
    #[error("parameter key")]
    ParameterKey,
    #[error("parameter value")]
    ParameterValue,
    #[error("parameters")]
    Parameters,
    #[error("tag")]
    Tag,
    #[error("tags")]
    Tags,
    #[error("view address")]
    ViewAddress,
    #[error("view")]
    View,
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("{field} too long ({len} bytes, max {max}).")]
    StringTooLong {
        field: WireField,
        len: usize,
        max: usize,
    },
    #[error("Too many {field} ({count}, max {max}).")]
    TooManyEntries {
        field: WireField,
        count: usize,
        max: usize,
    },
    #[error("Interaction payload too large ({len} bytes, max {max}).")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("Client index {index} does not fit in 32 bits.")]
    ClientIndexOutOfRange { index: usize },
    #[error("Interaction kind index {index} does not fit in 8 bits.")]
    KindIndexOutOfRange { index: usize },
    #[error("Unknown {family} message tag {tag}.")]
    UnknownTag { family: FrameFamily, tag: u8 },
    #[error("Truncated {family} frame: {source}")]
    Truncated {
        family: FrameFamily,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid UTF-8 in {field}: {source}")]
    InvalidUtf8 {
        field: WireField,
        #[source]
        source: std::string::FromUtf8Error,
    },
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
