use async_trait::async_trait;
use futures_util::future::try_join_all;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, trace};

use crate::distributed::protocol::{PrimaryParameters, SecondaryLink};
use crate::error::{AppError, AppResult, DistributedError};
use crate::results::BenchmarkResult;

use super::remote::RemoteSecondary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    AwaitingSecondaries,
    NegotiatingParameters,
    AcceptingPrepare,
    AwaitingAllReady,
    Running,
    CollectingResults,
    Closed,
}

impl CoordinatorState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CoordinatorState::AwaitingSecondaries => "awaiting secondaries",
            CoordinatorState::NegotiatingParameters => "negotiating parameters",
            CoordinatorState::AcceptingPrepare => "accepting prepare",
            CoordinatorState::AwaitingAllReady => "awaiting all ready",
            CoordinatorState::Running => "running",
            CoordinatorState::CollectingResults => "collecting results",
            CoordinatorState::Closed => "closed",
        }
    }
}

/// A connected secondary as seen by schedule generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub index: usize,
    pub address: String,
    pub tags: Vec<String>,
}

impl Location {
    /// Whether every tag of `filter` is carried by this secondary.
    #[must_use]
    pub fn matches(&self, filter: &[String]) -> bool {
        filter.iter().all(|tag| self.tags.contains(tag))
    }
}

/// Receives the clients and interactions produced by schedule generation.
#[async_trait]
pub trait ScheduleSink: Send {
    fn locations(&self) -> Vec<Location>;

    /// Creates a client of `kind` on `secondary` and returns its index there.
    ///
    /// # Errors
    ///
    /// Returns an error when the secondary is unknown or unreachable.
    async fn create_client(
        &mut self,
        secondary: usize,
        kind: &str,
        view: Vec<String>,
    ) -> AppResult<usize>;

    /// Schedules one interaction of `kind` for `client` at `offset` seconds.
    ///
    /// # Errors
    ///
    /// Returns an error when the client is unknown, a wire limit is exceeded,
    /// or the secondary is unreachable.
    async fn send_interaction(
        &mut self,
        secondary: usize,
        client: usize,
        kind: &str,
        offset: f64,
        payload: Vec<u8>,
    ) -> AppResult<()>;
}

/// Drives every secondary of one benchmark through prepare, start and
/// collection.
pub struct Coordinator<S> {
    params: PrimaryParameters,
    seed: u64,
    secondaries: Vec<RemoteSecondary<S>>,
    state: CoordinatorState,
}

impl<S> Coordinator<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    #[must_use]
    pub const fn new(params: PrimaryParameters, seed: u64) -> Self {
        Self {
            params,
            seed,
            secondaries: Vec::new(),
            state: CoordinatorState::AwaitingSecondaries,
        }
    }

    #[must_use]
    pub const fn state(&self) -> CoordinatorState {
        self.state
    }

    #[must_use]
    pub fn secondary_count(&self) -> usize {
        self.secondaries.len()
    }

    fn enter(&mut self, state: CoordinatorState) {
        debug!("coordinator {} -> {}", self.state.as_str(), state.as_str());
        self.state = state;
    }

    fn expect_state(&self, operation: &'static str, expected: CoordinatorState) -> AppResult<()> {
        if self.state == expected {
            return Ok(());
        }
        Err(AppError::distributed(DistributedError::InvalidState {
            operation,
            state: self.state.as_str(),
        }))
    }

    /// Negotiates parameters with a freshly connected secondary.
    pub(crate) async fn add_secondary(&mut self, link: SecondaryLink<S>) -> AppResult<usize> {
        self.expect_state("add secondary", CoordinatorState::AwaitingSecondaries)?;
        self.enter(CoordinatorState::NegotiatingParameters);
        let secondary = RemoteSecondary::negotiate(link, &self.params).await?;
        info!("Secondary {} joined", secondary.addr());
        self.secondaries.push(secondary);
        self.enter(CoordinatorState::AwaitingSecondaries);
        Ok(self.secondaries.len().saturating_sub(1))
    }

    /// Stops accepting secondaries and opens the prepare phase.
    ///
    /// # Errors
    ///
    /// Returns an error when no secondary joined or the coordinator is past
    /// the accept phase.
    pub fn seal(&mut self) -> AppResult<()> {
        self.expect_state("seal", CoordinatorState::AwaitingSecondaries)?;
        if self.secondaries.is_empty() {
            return Err(AppError::distributed(DistributedError::NoSecondaries));
        }
        self.enter(CoordinatorState::AcceptingPrepare);
        Ok(())
    }

    /// Benchmark duration: the largest scheduled offset on any secondary.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.secondaries
            .iter()
            .map(RemoteSecondary::end)
            .fold(0.0, f64::max)
    }

    fn secondary_mut(&mut self, index: usize) -> AppResult<&mut RemoteSecondary<S>> {
        self.secondaries
            .get_mut(index)
            .ok_or_else(|| AppError::distributed(DistributedError::UnknownSecondary { index }))
    }

    /// Runs the ready barrier, starts every secondary and collects their
    /// results in connection order.
    ///
    /// # Errors
    ///
    /// Returns an error when any secondary fails or reports an inconsistent
    /// result; no partial result is returned.
    pub async fn run(&mut self) -> AppResult<BenchmarkResult> {
        self.expect_state("run", CoordinatorState::AcceptingPrepare)?;
        let duration = self.duration();
        info!("Benchmark duration is {:.3} seconds", duration);

        self.enter(CoordinatorState::AwaitingAllReady);
        debug!("synchronize with {} secondaries", self.secondaries.len());
        try_join_all(self.secondaries.iter_mut().map(|secondary| secondary.ready())).await?;
        for secondary in &mut self.secondaries {
            secondary.release().await?;
        }

        self.enter(CoordinatorState::Running);
        info!("Start benchmark");
        for secondary in &mut self.secondaries {
            trace!("send start signal to {}", secondary.addr());
            secondary.start(duration).await?;
        }

        self.enter(CoordinatorState::CollectingResults);
        let mut result = BenchmarkResult::new(self.seed);
        for secondary in &mut self.secondaries {
            trace!("collect results from {}", secondary.addr());
            let collected = secondary.collect().await?;
            info!(
                "Collected {} clients from {}",
                collected.clients.len(),
                secondary.addr()
            );
            result.add_secondary(collected);
            if let Err(err) = secondary.close().await {
                debug!("Failed to close {}: {}", secondary.addr(), err);
            }
        }
        self.enter(CoordinatorState::Closed);
        Ok(result)
    }
}

#[async_trait]
impl<S> ScheduleSink for Coordinator<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn locations(&self) -> Vec<Location> {
        self.secondaries
            .iter()
            .enumerate()
            .map(|(index, secondary)| Location {
                index,
                address: secondary.addr().to_owned(),
                tags: secondary.tags().to_vec(),
            })
            .collect()
    }

    async fn create_client(
        &mut self,
        secondary: usize,
        kind: &str,
        view: Vec<String>,
    ) -> AppResult<usize> {
        self.expect_state("create client", CoordinatorState::AcceptingPrepare)?;
        self.secondary_mut(secondary)?
            .create_client(kind, view)
            .await
    }

    async fn send_interaction(
        &mut self,
        secondary: usize,
        client: usize,
        kind: &str,
        offset: f64,
        payload: Vec<u8>,
    ) -> AppResult<()> {
        self.expect_state("send interaction", CoordinatorState::AcceptingPrepare)?;
        self.secondary_mut(secondary)?
            .send_interaction(secondary, client, kind, offset, payload)
            .await
    }
}
