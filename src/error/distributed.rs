use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistributedError {
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Connection error to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Bind error on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown target system '{name}'.")]
    UnknownSystem { name: String },
    #[error("Secondary {addr} reported unknown client index {index}.")]
    InvalidResultClient { addr: String, index: usize },
    #[error("Secondary {addr} reported unknown kind index {kind} for client {index}.")]
    InvalidResultKind {
        addr: String,
        index: usize,
        kind: usize,
    },
    #[error("Unknown secondary {index}.")]
    UnknownSecondary { index: usize },
    #[error("Unknown client {client} on secondary {secondary}.")]
    UnknownClient { secondary: usize, client: usize },
    #[error("Interaction references unknown client index {index}.")]
    PrepareUnknownClient { index: usize },
    #[error("Client index {index} announced twice.")]
    DuplicateClient { index: usize },
    #[error("Client {index} has too many interaction kinds (max {max}).")]
    TooManyKinds { index: usize, max: usize },
    #[error("Invalid scheduled offset {offset} for client {index}.")]
    InvalidOffset { index: usize, offset: f64 },
    #[error("Operation '{operation}' not allowed while coordinator is {state}.")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    #[error("Unexpected message from {peer} (expected {expected}).")]
    UnexpectedMessage {
        peer: String,
        expected: &'static str,
    },
    #[error("No secondary matches location tags {tags:?}.")]
    NoMatchingSecondary { tags: Vec<String> },
    #[error("Secondary count must be >= 1.")]
    NoSecondaries,
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
