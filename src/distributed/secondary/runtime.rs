use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::adapter::{SystemRegistry, TargetSystem};
use crate::distributed::protocol::{
    PrepareMessage, PrimaryLink, PrimaryParameters, ResultMessage, SecondaryParameters,
};
use crate::error::{AppError, AppResult, DistributedError};

use super::dispatch::{dispatch, drain};
use super::interaction::PreparedEntry;
use super::prepare::Preparation;
use super::warnings::TimingMonitor;

/// How a secondary connects and runs its share of a benchmark.
#[derive(Debug, Clone)]
pub struct SecondaryOptions {
    pub primary: String,
    pub tags: Vec<String>,
    pub env: Vec<String>,
    pub decode_concurrency: usize,
    pub drain_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryState {
    Connected,
    Preparing,
    Ready,
    Running,
    Stopped,
}

impl SecondaryState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SecondaryState::Connected => "connected",
            SecondaryState::Preparing => "preparing",
            SecondaryState::Ready => "ready",
            SecondaryState::Running => "running",
            SecondaryState::Stopped => "stopped",
        }
    }
}

/// What a finished secondary session did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub clients: usize,
    pub interactions: usize,
}

/// Connects to the primary and runs one benchmark session.
///
/// # Errors
///
/// Returns an error when the primary cannot be reached, the protocol is
/// violated, or preparing an interaction fails.
pub async fn run_secondary(
    options: &SecondaryOptions,
    registry: &SystemRegistry,
) -> AppResult<SessionSummary> {
    info!("Connecting to primary {}", options.primary);
    let stream = TcpStream::connect(&options.primary).await.map_err(|err| {
        AppError::distributed(DistributedError::Connection {
            addr: options.primary.clone(),
            source: err,
        })
    })?;
    if let Err(err) = stream.set_nodelay(true) {
        debug!("Failed to disable Nagle on primary connection: {}", err);
    }
    let link = PrimaryLink::new(stream, options.primary.clone());
    SecondaryRuntime::new(link, options).run(registry).await
}

pub(crate) struct SecondaryRuntime<'opts, S> {
    link: PrimaryLink<S>,
    options: &'opts SecondaryOptions,
    state: SecondaryState,
}

impl<'opts, S> SecondaryRuntime<'opts, S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) const fn new(link: PrimaryLink<S>, options: &'opts SecondaryOptions) -> Self {
        Self {
            link,
            options,
            state: SecondaryState::Connected,
        }
    }

    fn enter(&mut self, state: SecondaryState) {
        debug!(
            "secondary {} -> {}",
            self.state.as_str(),
            state.as_str()
        );
        self.state = state;
    }

    pub(crate) async fn run(mut self, registry: &SystemRegistry) -> AppResult<SessionSummary> {
        let params = self
            .link
            .negotiate(&SecondaryParameters {
                tags: self.options.tags.clone(),
            })
            .await?;
        let system = registry.system(&params.sysname).ok_or_else(|| {
            AppError::distributed(DistributedError::UnknownSystem {
                name: params.sysname.clone(),
            })
        })?;
        info!(
            "Primary {} benchmarks '{}' (max delay {}s, max skew {}s)",
            self.link.peer(),
            params.sysname,
            params.max_delay,
            params.max_skew
        );

        self.enter(SecondaryState::Preparing);
        let (clients, schedule) = self.prepare(system, &params).await?;
        let interactions = schedule.len();
        info!(
            "Prepared {} interactions for {} clients",
            interactions, clients
        );

        self.enter(SecondaryState::Ready);
        self.link.sync_ready().await?;
        let start_message = self.link.wait_start().await?;
        let start = Instant::now();

        self.enter(SecondaryState::Running);
        info!(
            "Benchmark started (expected duration {:.3}s)",
            start_message.duration
        );
        let monitor = Arc::new(TimingMonitor::new(params.max_skew, params.max_delay));
        let mut dispatched = dispatch(schedule, start, &monitor).await;
        drain(&mut dispatched.tasks, self.options.drain_timeout).await;

        self.enter(SecondaryState::Stopped);
        info!(
            "Benchmark finished after {:.3}s, reporting results",
            start.elapsed().as_secs_f64()
        );
        for interaction in &dispatched.interactions {
            self.link
                .push_result(&ResultMessage::Interaction(interaction.record()))
                .await?;
        }
        self.link.push_result(&ResultMessage::Done).await?;
        self.link.close().await?;

        Ok(SessionSummary {
            clients,
            interactions,
        })
    }

    async fn prepare(
        &mut self,
        system: Arc<dyn TargetSystem>,
        params: &PrimaryParameters,
    ) -> AppResult<(usize, Vec<PreparedEntry>)> {
        let mut preparation = Preparation::new(
            system,
            params.params.clone(),
            self.options.env.clone(),
            self.options.decode_concurrency,
        );
        let mut clients = 0_usize;
        loop {
            match self.link.wait_prepare().await? {
                PrepareMessage::Done => break,
                PrepareMessage::Client(client) => {
                    preparation.add_client(&client)?;
                    clients = clients.saturating_add(1);
                }
                PrepareMessage::Interaction(interaction) => {
                    preparation.add_interaction(interaction).await?;
                }
            }
        }
        let schedule = preparation.finish().await?;
        Ok((clients, schedule))
    }
}
