use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::distributed::protocol::InteractionRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub seed: u64,
    pub secondaries: Vec<SecondaryResult>,
}

impl BenchmarkResult {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            secondaries: Vec::new(),
        }
    }

    pub fn add_secondary(&mut self, secondary: SecondaryResult) {
        self.secondaries.push(secondary);
    }

    /// Every interaction of the run with the kind of the client that sent it.
    pub fn interactions(&self) -> impl Iterator<Item = (&ClientResult, &InteractionResult)> {
        self.secondaries
            .iter()
            .flat_map(|secondary| secondary.clients.iter())
            .flat_map(|client| {
                client
                    .interactions
                    .iter()
                    .map(move |interaction| (client, interaction))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryResult {
    pub address: String,
    pub tags: Vec<String>,
    pub clients: Vec<ClientResult>,
    /// Client index to position in `clients`.
    #[serde(skip)]
    positions: HashMap<usize, usize>,
}

impl SecondaryResult {
    #[must_use]
    pub fn new(address: String, tags: Vec<String>) -> Self {
        Self {
            address,
            tags,
            clients: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Appends `record` to the client it belongs to, creating the client
    /// entry with `client_kind` the first time its index is seen.
    pub fn add_result(
        &mut self,
        record: &InteractionRecord,
        client_kind: &str,
        interaction_kind: &str,
    ) {
        let position = match self.positions.get(&record.client) {
            Some(position) => *position,
            None => {
                let position = self.clients.len();
                self.positions.insert(record.client, position);
                self.clients.push(ClientResult {
                    index: record.client,
                    kind: client_kind.to_owned(),
                    interactions: Vec::new(),
                });
                position
            }
        };
        if let Some(client) = self.clients.get_mut(position) {
            client.interactions.push(InteractionResult {
                kind: interaction_kind.to_owned(),
                submit_time: record.submit_time,
                commit_time: record.commit_time,
                abort_time: record.abort_time,
                has_error: record.has_error,
            });
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientResult {
    pub index: usize,
    pub kind: String,
    pub interactions: Vec<InteractionResult>,
}

/// Times are seconds since the start signal; `None` when the event did not
/// happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResult {
    pub kind: String,
    pub submit_time: Option<f64>,
    pub commit_time: Option<f64>,
    pub abort_time: Option<f64>,
    pub has_error: bool,
}

impl InteractionResult {
    /// Seconds between submit and commit, when both happened.
    #[must_use]
    pub fn latency(&self) -> Option<f64> {
        let submit = self.submit_time?;
        self.commit_time.map(|commit| commit - submit)
    }
}
