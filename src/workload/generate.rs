use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::adapter::{InteractionInfo, PayloadBuilder};
use crate::config::BenchmarkPlan;
use crate::distributed::primary::{Location, ScheduleSink};
use crate::error::{AppError, AppResult, DistributedError};
use crate::schedule::{FireTimes, merge_schedules};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenerationSummary {
    pub clients: usize,
    pub interactions: u64,
    /// Offset of the last scheduled interaction.
    pub duration: f64,
}

struct PlacedClient {
    number: usize,
    secondary: usize,
    index: usize,
    sent: u64,
}

struct Stream<'plan> {
    client: usize,
    interaction: &'plan str,
}

/// Creates every client of `plan` through `sink`, then encodes and sends all
/// interactions in offset order.
///
/// The placement of clients and their endpoint views only depend on `seed`
/// and the order of `sink.locations()`.
///
/// # Errors
///
/// Returns an error when a workload location matches no secondary, the
/// builder rejects an interaction type, or the sink fails.
pub async fn generate<S>(
    plan: &BenchmarkPlan,
    sink: &mut S,
    builder: &mut dyn PayloadBuilder,
    seed: u64,
) -> AppResult<GenerationSummary>
where
    S: ScheduleSink + ?Sized,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let locations = sink.locations();
    let mut clients: Vec<PlacedClient> = Vec::new();
    let mut streams: Vec<Stream<'_>> = Vec::new();
    let mut sources: Vec<FireTimes> = Vec::new();

    for workload in &plan.workloads {
        let matches: Vec<&Location> = locations
            .iter()
            .filter(|location| location.matches(&workload.location))
            .collect();
        if matches.is_empty() {
            return Err(AppError::distributed(DistributedError::NoMatchingSecondary {
                tags: workload.location.clone(),
            }));
        }
        let mut rotation = matches.iter().cycle();
        for _ in 0..workload.number {
            let Some(location) = rotation.next() else {
                break;
            };
            let view: Vec<String> = workload
                .candidates
                .choose_multiple(&mut rng, workload.view)
                .cloned()
                .collect();
            let index = sink
                .create_client(location.index, &workload.name, view)
                .await?;
            let number = clients.len();
            debug!(
                "client {} ({}) placed on {} as {}",
                number, workload.name, location.address, index
            );
            clients.push(PlacedClient {
                number,
                secondary: location.index,
                index,
                sent: 0,
            });
            for behavior in &workload.behaviors {
                streams.push(Stream {
                    client: number,
                    interaction: &behavior.interaction,
                });
                sources.push(behavior.load.fire_times());
            }
        }
    }

    let mut summary = GenerationSummary {
        clients: clients.len(),
        ..GenerationSummary::default()
    };
    for (source, offset) in merge_schedules(sources) {
        let Some(stream) = streams.get(source) else {
            continue;
        };
        let Some(client) = clients.get_mut(stream.client) else {
            continue;
        };
        let info = InteractionInfo {
            client: client.number,
            sequence: client.sent,
        };
        let payload = builder
            .encode_interaction(stream.interaction, &info)
            .map_err(AppError::adapter)?;
        sink.send_interaction(
            client.secondary,
            client.index,
            stream.interaction,
            offset,
            payload,
        )
        .await?;
        client.sent = client.sent.saturating_add(1);
        summary.interactions = summary.interactions.saturating_add(1);
        summary.duration = summary.duration.max(offset);
    }

    info!(
        "Scheduled {} interactions for {} clients over {:.3}s",
        summary.interactions, summary.clients, summary.duration
    );
    Ok(summary)
}
