use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::adapter::{SystemParams, TargetClient, TargetSystem};
use crate::distributed::protocol::{PrepareClient, PrepareInteraction};
use crate::error::{AppError, AppResult, DistributedError};

use super::interaction::PreparedEntry;

/// Collects the clients and interactions of the prepare phase.
///
/// Payloads are decoded by background tasks; at most `concurrency` decodes
/// are in flight, and accepting another interaction waits for a free slot.
pub(crate) struct Preparation {
    system: Arc<dyn TargetSystem>,
    params: SystemParams,
    env: Vec<String>,
    clients: HashMap<usize, Arc<dyn TargetClient>>,
    permits: Arc<Semaphore>,
    tasks: JoinSet<AppResult<PreparedEntry>>,
    next_sequence: usize,
}

impl Preparation {
    pub(crate) fn new(
        system: Arc<dyn TargetSystem>,
        params: SystemParams,
        env: Vec<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            system,
            params,
            env,
            clients: HashMap::new(),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            tasks: JoinSet::new(),
            next_sequence: 0,
        }
    }

    pub(crate) fn add_client(&mut self, message: &PrepareClient) -> AppResult<()> {
        if self.clients.contains_key(&message.index) {
            return Err(AppError::distributed(DistributedError::DuplicateClient {
                index: message.index,
            }));
        }
        let client = self
            .system
            .client(&self.params, &self.env, &message.view)
            .map_err(AppError::adapter)?;
        debug!(
            "created client {} with {} view addresses",
            message.index,
            message.view.len()
        );
        self.clients.insert(message.index, client);
        Ok(())
    }

    pub(crate) async fn add_interaction(&mut self, message: PrepareInteraction) -> AppResult<()> {
        let client = self.clients.get(&message.client).cloned().ok_or_else(|| {
            AppError::distributed(DistributedError::PrepareUnknownClient {
                index: message.client,
            })
        })?;
        if !message.offset.is_finite() || message.offset < 0.0 {
            return Err(AppError::distributed(DistributedError::InvalidOffset {
                index: message.client,
                offset: message.offset,
            }));
        }

        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_err| {
                AppError::distributed(DistributedError::InvalidState {
                    operation: "decode interaction",
                    state: "closed",
                })
            })?;
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        self.tasks.spawn(async move {
            let prepared = client
                .decode(&message.payload)
                .await
                .map_err(AppError::adapter)?;
            drop(permit);
            Ok(PreparedEntry {
                client: message.client,
                kind: message.kind,
                offset: message.offset,
                sequence,
                prepared,
            })
        });
        Ok(())
    }

    /// Waits for every decode and returns the schedule sorted by offset.
    /// Interactions with equal offsets keep their arrival order.
    pub(crate) async fn finish(mut self) -> AppResult<Vec<PreparedEntry>> {
        let mut entries = Vec::with_capacity(self.next_sequence);
        while let Some(joined) = self.tasks.join_next().await {
            entries.push(joined??);
        }
        entries.sort_by(|left, right| {
            left.offset
                .total_cmp(&right.offset)
                .then_with(|| left.sequence.cmp(&right.sequence))
        });
        Ok(entries)
    }
}
