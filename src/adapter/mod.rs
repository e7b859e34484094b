//! The seam between the harness and a concrete target system.
//!
//! The primary asks a [`PayloadBuilder`] to turn interaction types into
//! opaque payload bytes; each secondary asks a [`TargetClient`] to decode
//! those bytes into a [`PreparedInteraction`] ahead of time and triggers it
//! at its scheduled offset.

mod mock;
mod registry;


use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AdapterError;

pub use mock::MockSystem;
pub use registry::{SystemRegistry, system_registry};

/// Backend parameters shared by the primary and every secondary.
pub type SystemParams = BTreeMap<String, String>;

/// Target-system endpoint addresses mapped to their tags.
pub type Endpoints = BTreeMap<String, Vec<String>>;

/// What a builder knows about the interaction it encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionInfo {
    /// Benchmark-wide client number.
    pub client: usize,
    /// Position of this interaction among the client's interactions.
    pub sequence: u64,
}

pub trait TargetSystem: Send + Sync {
    fn name(&self) -> &'static str;

    /// Creates the primary-side payload encoder.
    ///
    /// # Errors
    ///
    /// Returns an error when `params` are invalid for this system.
    fn builder(
        &self,
        params: &SystemParams,
        env: &[String],
        endpoints: &Endpoints,
    ) -> Result<Box<dyn PayloadBuilder>, AdapterError>;

    /// Creates a secondary-side client bound to `view`.
    ///
    /// # Errors
    ///
    /// Returns an error when `params` are invalid for this system.
    fn client(
        &self,
        params: &SystemParams,
        env: &[String],
        view: &[String],
    ) -> Result<Arc<dyn TargetClient>, AdapterError>;
}

pub trait PayloadBuilder: Send {
    /// Encodes one interaction of type `itype`.
    ///
    /// # Errors
    ///
    /// Returns an error when `itype` is not supported.
    fn encode_interaction(
        &mut self,
        itype: &str,
        info: &InteractionInfo,
    ) -> Result<Vec<u8>, AdapterError>;
}

#[async_trait]
pub trait TargetClient: Send + Sync {
    /// Turns payload bytes into a ready-to-fire interaction. May be slow
    /// (signing), and runs before the benchmark starts.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is malformed.
    async fn decode(&self, payload: &[u8]) -> Result<Box<dyn PreparedInteraction>, AdapterError>;
}

#[async_trait]
pub trait PreparedInteraction: Send + Sync {
    /// Sends the interaction and reports its lifecycle through `reporter`.
    ///
    /// # Errors
    ///
    /// Returns an error when the interaction failed; timestamps reported so
    /// far are kept.
    async fn trigger(&self, reporter: &dyn InteractionReporter) -> Result<(), AdapterError>;
}

/// Lifecycle callbacks handed to [`PreparedInteraction::trigger`].
///
/// Each callback takes effect at most once per interaction; repeated calls
/// are logged and ignored.
pub trait InteractionReporter: Send + Sync {
    fn report_submit(&self);
    fn report_commit(&self);
    fn report_abort(&self);
}
