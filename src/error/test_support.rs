use super::{
    AdapterError, ConfigError, DistributedError, ScheduleError, ValidationError, WireError,
};

impl From<&'static str> for ValidationError {
    fn from(message: &'static str) -> Self {
        ValidationError::TestExpectation { message }
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for WireError {
    fn from(message: &'static str) -> Self {
        WireError::TestExpectation { message }
    }
}

impl From<String> for WireError {
    fn from(value: String) -> Self {
        WireError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for DistributedError {
    fn from(message: &'static str) -> Self {
        DistributedError::TestExpectation { message }
    }
}

impl From<String> for DistributedError {
    fn from(value: String) -> Self {
        DistributedError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for AdapterError {
    fn from(message: &'static str) -> Self {
        AdapterError::TestExpectation { message }
    }
}

impl From<String> for AdapterError {
    fn from(value: String) -> Self {
        AdapterError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ScheduleError {
    fn from(message: &'static str) -> Self {
        ScheduleError::TestExpectation { message }
    }
}

impl From<String> for ScheduleError {
    fn from(value: String) -> Self {
        ScheduleError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
