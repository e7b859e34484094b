use std::collections::BTreeMap;

/// Longest string carried behind a one byte length prefix.
pub const MAX_SHORT_STRING: usize = u8::MAX as usize;
/// Most entries carried behind a one byte count.
pub const MAX_SHORT_COUNT: usize = u8::MAX as usize;
/// Most view addresses per client (u16 count).
pub const MAX_VIEW_ADDRESSES: usize = u16::MAX as usize;
/// Largest interaction payload (u16 length).
pub const MAX_PAYLOAD_BYTES: usize = u16::MAX as usize;
/// Most interaction kinds a single client can use (u8 index).
pub const MAX_KINDS_PER_CLIENT: usize = u8::MAX as usize;

pub(crate) const PREPARE_TAG_DONE: u8 = 0;
pub(crate) const PREPARE_TAG_CLIENT: u8 = 1;
pub(crate) const PREPARE_TAG_INTERACTION: u8 = 2;

pub(crate) const RESULT_TAG_DONE: u8 = 0;
pub(crate) const RESULT_TAG_INTERACTION: u8 = 1;

/// Sent by the primary right after a secondary connects.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryParameters {
    pub sysname: String,
    pub params: BTreeMap<String, String>,
    /// Seconds an interaction may be submitted late before a warning.
    pub max_delay: f64,
    /// Seconds the dispatch loop may fall behind before a warning.
    pub max_skew: f64,
}

/// Reply of a secondary to [`PrimaryParameters`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecondaryParameters {
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrepareMessage {
    Done,
    Client(PrepareClient),
    Interaction(PrepareInteraction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareClient {
    pub index: usize,
    /// Ordered target-system addresses this client talks to.
    pub view: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrepareInteraction {
    pub client: usize,
    pub kind: usize,
    /// Seconds since benchmark start.
    pub offset: f64,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartMessage {
    /// Advisory benchmark duration in seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultMessage {
    Done,
    Interaction(InteractionRecord),
}

/// Outcome of one interaction, times in seconds since the start signal.
///
/// On the wire an absent time is a negative value.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    pub client: usize,
    pub kind: usize,
    pub submit_time: Option<f64>,
    pub commit_time: Option<f64>,
    pub abort_time: Option<f64>,
    pub has_error: bool,
}
