use std::collections::BTreeMap;

use tokio::io::{DuplexStream, duplex};
use tokio::task::JoinHandle;

use super::*;
use crate::distributed::protocol::{
    InteractionRecord, PrepareInteraction, PrepareMessage, PrimaryLink, PrimaryParameters,
    ResultMessage, SecondaryLink, SecondaryParameters,
};
use crate::error::{AppError, AppResult, DistributedError};
use crate::test_support::{approx_eq, run_async_test};

#[derive(Debug, Clone, Copy)]
enum Script {
    /// Reports every interaction as committed 10 ms after its offset.
    Echo,
    /// Reports a client index that was never prepared.
    BadClient,
    /// Reports a kind index the client never used.
    BadKind,
}

#[derive(Debug, Default)]
struct Observed {
    clients: Vec<(usize, Vec<String>)>,
    interactions: Vec<PrepareInteraction>,
    duration: f64,
}

fn params() -> PrimaryParameters {
    PrimaryParameters {
        sysname: "mock".to_owned(),
        params: BTreeMap::new(),
        max_delay: 0.5,
        max_skew: 0.5,
    }
}

fn record_for(interaction: &PrepareInteraction, script: Script) -> InteractionRecord {
    let (client, kind) = match script {
        Script::Echo => (interaction.client, interaction.kind),
        Script::BadClient => (interaction.client.saturating_add(5), interaction.kind),
        Script::BadKind => (interaction.client, interaction.kind.saturating_add(9)),
    };
    InteractionRecord {
        client,
        kind,
        submit_time: Some(interaction.offset),
        commit_time: Some(interaction.offset + 0.010),
        abort_time: None,
        has_error: false,
    }
}

fn spawn_scripted(stream: DuplexStream, script: Script) -> JoinHandle<AppResult<Observed>> {
    tokio::spawn(async move {
        let mut link = PrimaryLink::new(stream, "primary".to_owned());
        let mut observed = Observed::default();
        link.negotiate(&SecondaryParameters {
            tags: vec!["scripted".to_owned()],
        })
        .await?;
        loop {
            match link.wait_prepare().await? {
                PrepareMessage::Done => break,
                PrepareMessage::Client(client) => observed.clients.push((client.index, client.view)),
                PrepareMessage::Interaction(interaction) => observed.interactions.push(interaction),
            }
        }
        link.sync_ready().await?;
        observed.duration = link.wait_start().await?.duration;
        for interaction in &observed.interactions {
            link.push_result(&ResultMessage::Interaction(record_for(interaction, script)))
                .await?;
        }
        link.push_result(&ResultMessage::Done).await?;
        Ok(observed)
    })
}

async fn connect(
    coordinator: &mut Coordinator<DuplexStream>,
    script: Script,
) -> AppResult<JoinHandle<AppResult<Observed>>> {
    let (primary_side, secondary_side) = duplex(64 * 1024);
    let handle = spawn_scripted(secondary_side, script);
    let name = format!("secondary-{}", coordinator.secondary_count());
    coordinator
        .add_secondary(SecondaryLink::new(primary_side, name))
        .await?;
    Ok(handle)
}

async fn join(handle: JoinHandle<AppResult<Observed>>) -> AppResult<Observed> {
    handle.await?
}

#[test]
fn coordinator_runs_a_full_session() -> AppResult<()> {
    run_async_test(async {
        let mut coordinator = Coordinator::new(params(), 99);
        let handle = connect(&mut coordinator, Script::Echo).await?;
        coordinator.seal()?;

        let locations = coordinator.locations();
        let tags_ok = locations
            .first()
            .is_some_and(|location| location.tags == ["scripted", "secondary-0"]);
        if !tags_ok {
            return Err(AppError::distributed(format!(
                "Unexpected locations: {:?}",
                locations
            )));
        }

        let client = coordinator
            .create_client(0, "wallet", vec!["node-a:7000".to_owned()])
            .await?;
        for (kind, offset) in [("transfer", 0.0), ("invoke", 0.5), ("transfer", 1.5)] {
            coordinator
                .send_interaction(0, client, kind, offset, vec![1, 2, 3])
                .await?;
        }
        if !approx_eq(coordinator.duration(), 1.5, 1e-12) {
            return Err(AppError::distributed("Duration should be the max offset"));
        }

        let result = coordinator.run().await?;
        if coordinator.state() != CoordinatorState::Closed {
            return Err(AppError::distributed("Coordinator should be closed"));
        }
        let observed = join(handle).await?;

        if observed.clients != [(0, vec!["node-a:7000".to_owned()])] {
            return Err(AppError::distributed(format!(
                "Unexpected clients: {:?}",
                observed.clients
            )));
        }
        let wire_kinds: Vec<usize> = observed.interactions.iter().map(|i| i.kind).collect();
        if wire_kinds != [0, 1, 0] {
            return Err(AppError::distributed(format!(
                "Unexpected wire kinds: {:?}",
                wire_kinds
            )));
        }
        if !approx_eq(observed.duration, 1.5, 1e-12) {
            return Err(AppError::distributed("Start should carry the duration"));
        }

        if result.seed != 99 || result.secondaries.len() != 1 {
            return Err(AppError::distributed("Unexpected result tree"));
        }
        let kinds: Vec<(&str, &str)> = result
            .interactions()
            .map(|(client, interaction)| (client.kind.as_str(), interaction.kind.as_str()))
            .collect();
        let expected = [
            ("wallet", "transfer"),
            ("wallet", "invoke"),
            ("wallet", "transfer"),
        ];
        if kinds != expected {
            return Err(AppError::distributed(format!("Unexpected kinds: {:?}", kinds)));
        }
        let latencies_ok = result.interactions().all(|(_, interaction)| {
            interaction
                .latency()
                .is_some_and(|latency| approx_eq(latency, 0.010, 1e-9))
        });
        if !latencies_ok {
            return Err(AppError::distributed("Unexpected latencies"));
        }
        Ok(())
    })
}

#[test]
fn clients_are_indexed_per_secondary() -> AppResult<()> {
    run_async_test(async {
        let mut coordinator = Coordinator::new(params(), 1);
        let first = connect(&mut coordinator, Script::Echo).await?;
        let second = connect(&mut coordinator, Script::Echo).await?;
        coordinator.seal()?;

        let a = coordinator.create_client(0, "wallet", Vec::new()).await?;
        let b = coordinator.create_client(1, "wallet", Vec::new()).await?;
        let c = coordinator.create_client(0, "wallet", Vec::new()).await?;
        if (a, b, c) != (0, 0, 1) {
            return Err(AppError::distributed(format!(
                "Unexpected client indices: {:?}",
                (a, b, c)
            )));
        }
        coordinator.send_interaction(1, b, "invoke", 0.25, Vec::new()).await?;

        let result = coordinator.run().await?;
        join(first).await?;
        let observed = join(second).await?;
        if observed.interactions.len() != 1 {
            return Err(AppError::distributed("Second secondary should get one interaction"));
        }
        let addresses: Vec<&str> = result
            .secondaries
            .iter()
            .map(|secondary| secondary.address.as_str())
            .collect();
        if addresses != ["secondary-0", "secondary-1"] {
            return Err(AppError::distributed(format!(
                "Results should follow connection order: {:?}",
                addresses
            )));
        }
        Ok(())
    })
}

#[test]
fn unknown_result_client_fails_collection() -> AppResult<()> {
    run_async_test(async {
        let mut coordinator = Coordinator::new(params(), 1);
        let _handle = connect(&mut coordinator, Script::BadClient).await?;
        coordinator.seal()?;
        let client = coordinator.create_client(0, "wallet", Vec::new()).await?;
        coordinator.send_interaction(0, client, "transfer", 0.0, Vec::new()).await?;

        match coordinator.run().await {
            Err(AppError::Distributed(DistributedError::InvalidResultClient { index: 5, .. })) => {
                Ok(())
            }
            other => Err(AppError::distributed(format!(
                "Expected InvalidResultClient, got {:?}",
                other.map(|result| result.secondaries.len())
            ))),
        }
    })
}

#[test]
fn unknown_result_kind_fails_collection() -> AppResult<()> {
    run_async_test(async {
        let mut coordinator = Coordinator::new(params(), 1);
        let _handle = connect(&mut coordinator, Script::BadKind).await?;
        coordinator.seal()?;
        let client = coordinator.create_client(0, "wallet", Vec::new()).await?;
        coordinator.send_interaction(0, client, "transfer", 0.0, Vec::new()).await?;

        match coordinator.run().await {
            Err(AppError::Distributed(DistributedError::InvalidResultKind { kind: 9, .. })) => {
                Ok(())
            }
            other => Err(AppError::distributed(format!(
                "Expected InvalidResultKind, got {:?}",
                other.map(|result| result.secondaries.len())
            ))),
        }
    })
}

#[test]
fn prepare_is_rejected_outside_its_phase() -> AppResult<()> {
    run_async_test(async {
        let mut coordinator = Coordinator::new(params(), 1);
        let _handle = connect(&mut coordinator, Script::Echo).await?;

        match coordinator.create_client(0, "wallet", Vec::new()).await {
            Err(AppError::Distributed(DistributedError::InvalidState { .. })) => {}
            other => {
                return Err(AppError::distributed(format!(
                    "Expected InvalidState before seal, got {:?}",
                    other
                )));
            }
        }
        match coordinator.run().await {
            Err(AppError::Distributed(DistributedError::InvalidState { .. })) => {}
            _ => return Err(AppError::distributed("Expected InvalidState for early run")),
        }
        coordinator.seal()?;
        match coordinator.seal() {
            Err(AppError::Distributed(DistributedError::InvalidState { .. })) => Ok(()),
            other => Err(AppError::distributed(format!(
                "Expected InvalidState for second seal, got {:?}",
                other
            ))),
        }
    })
}

#[test]
fn invalid_interactions_are_rejected() -> AppResult<()> {
    run_async_test(async {
        let mut coordinator = Coordinator::new(params(), 1);
        let _handle = connect(&mut coordinator, Script::Echo).await?;
        coordinator.seal()?;
        let client = coordinator.create_client(0, "wallet", Vec::new()).await?;

        match coordinator.send_interaction(0, client, "transfer", -1.0, Vec::new()).await {
            Err(AppError::Distributed(DistributedError::InvalidOffset { .. })) => {}
            other => {
                return Err(AppError::distributed(format!(
                    "Expected InvalidOffset, got {:?}",
                    other
                )));
            }
        }
        match coordinator.send_interaction(0, 7, "transfer", 0.0, Vec::new()).await {
            Err(AppError::Distributed(DistributedError::UnknownClient { client: 7, .. })) => {}
            other => {
                return Err(AppError::distributed(format!(
                    "Expected UnknownClient, got {:?}",
                    other
                )));
            }
        }
        match coordinator.create_client(3, "wallet", Vec::new()).await {
            Err(AppError::Distributed(DistributedError::UnknownSecondary { index: 3 })) => Ok(()),
            other => Err(AppError::distributed(format!(
                "Expected UnknownSecondary, got {:?}",
                other
            ))),
        }
    })
}

#[test]
fn kinds_per_client_are_bounded() -> AppResult<()> {
    run_async_test(async {
        let mut coordinator = Coordinator::new(params(), 1);
        let _handle = connect(&mut coordinator, Script::Echo).await?;
        coordinator.seal()?;
        let client = coordinator.create_client(0, "wallet", Vec::new()).await?;
        for kind in 0..255_u32 {
            coordinator
                .send_interaction(0, client, &format!("kind-{}", kind), 0.0, Vec::new())
                .await?;
        }
        coordinator
            .send_interaction(0, client, "kind-0", 0.0, Vec::new())
            .await?;
        match coordinator
            .send_interaction(0, client, "kind-255", 0.0, Vec::new())
            .await
        {
            Err(AppError::Distributed(DistributedError::TooManyKinds { .. })) => Ok(()),
            other => Err(AppError::distributed(format!(
                "Expected TooManyKinds, got {:?}",
                other
            ))),
        }
    })
}

#[test]
fn sealing_without_secondaries_fails() -> AppResult<()> {
    let mut coordinator: Coordinator<DuplexStream> = Coordinator::new(params(), 1);
    match coordinator.seal() {
        Err(AppError::Distributed(DistributedError::NoSecondaries)) => Ok(()),
        other => Err(AppError::distributed(format!(
            "Expected NoSecondaries, got {:?}",
            other
        ))),
    }
}
