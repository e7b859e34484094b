use async_trait::async_trait;

use super::generate;
use crate::adapter::{InteractionInfo, MockSystem, PayloadBuilder, SystemParams, TargetSystem};
use crate::config::{BehaviorPlan, BenchmarkPlan, WorkloadPlan};
use crate::distributed::primary::{Location, ScheduleSink};
use crate::error::{AdapterError, AppError, AppResult, DistributedError};
use crate::schedule::{LoadCurve, flatten_loads};
use crate::test_support::run_async_test;

#[derive(Debug, Clone, PartialEq)]
struct CreatedClient {
    secondary: usize,
    kind: String,
    view: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct SentInteraction {
    secondary: usize,
    client: usize,
    kind: String,
    offset: f64,
    payload: Vec<u8>,
}

struct RecordingSink {
    locations: Vec<Location>,
    clients: Vec<CreatedClient>,
    sent: Vec<SentInteraction>,
}

impl RecordingSink {
    fn new(tags: &[&[&str]]) -> Self {
        let locations = tags
            .iter()
            .enumerate()
            .map(|(index, tags)| Location {
                index,
                address: format!("10.0.0.{}:4000", index),
                tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            })
            .collect();
        Self {
            locations,
            clients: Vec::new(),
            sent: Vec::new(),
        }
    }

    fn clients_on(&self, secondary: usize) -> usize {
        self.clients
            .iter()
            .filter(|client| client.secondary == secondary)
            .count()
    }
}

#[async_trait]
impl ScheduleSink for RecordingSink {
    fn locations(&self) -> Vec<Location> {
        self.locations.clone()
    }

    async fn create_client(
        &mut self,
        secondary: usize,
        kind: &str,
        view: Vec<String>,
    ) -> AppResult<usize> {
        let index = self.clients_on(secondary);
        self.clients.push(CreatedClient {
            secondary,
            kind: kind.to_owned(),
            view,
        });
        Ok(index)
    }

    async fn send_interaction(
        &mut self,
        secondary: usize,
        client: usize,
        kind: &str,
        offset: f64,
        payload: Vec<u8>,
    ) -> AppResult<()> {
        self.sent.push(SentInteraction {
            secondary,
            client,
            kind: kind.to_owned(),
            offset,
            payload,
        });
        Ok(())
    }
}

struct LabelBuilder;

impl PayloadBuilder for LabelBuilder {
    fn encode_interaction(
        &mut self,
        itype: &str,
        info: &InteractionInfo,
    ) -> Result<Vec<u8>, AdapterError> {
        Ok(format!("{}:{}:{}", itype, info.client, info.sequence).into_bytes())
    }
}

fn curve(points: &[(f64, f64)]) -> AppResult<LoadCurve> {
    LoadCurve::new(points.iter().copied()).map_err(AppError::schedule)
}

fn workload(
    name: &str,
    number: usize,
    location: &[&str],
    view: usize,
    behaviors: Vec<BehaviorPlan>,
) -> WorkloadPlan {
    WorkloadPlan {
        name: name.to_owned(),
        number,
        location: location.iter().map(|tag| (*tag).to_owned()).collect(),
        candidates: vec![
            "node-a:7000".to_owned(),
            "node-b:7000".to_owned(),
            "node-c:7000".to_owned(),
        ],
        view,
        behaviors,
    }
}

fn plan(workloads: Vec<WorkloadPlan>) -> BenchmarkPlan {
    BenchmarkPlan {
        system: "mock".to_owned(),
        parameters: SystemParams::new(),
        endpoints: crate::adapter::Endpoints::new(),
        workloads,
    }
}

fn behavior(interaction: &str, load: LoadCurve) -> BehaviorPlan {
    BehaviorPlan {
        interaction: interaction.to_owned(),
        load,
    }
}

#[test]
fn clients_rotate_over_matching_secondaries() -> AppResult<()> {
    run_async_test(async {
        let load = curve(&[(0.0, 2.0), (1.0, 0.0)])?;
        let plan = plan(vec![
            workload("eu-clients", 3, &["eu"], 1, vec![behavior("transfer", load.clone())]),
            workload("us-clients", 2, &["us"], 1, vec![behavior("transfer", load)]),
        ]);
        let mut sink = RecordingSink::new(&[&["eu"], &["eu", "us"], &["asia"]]);

        let summary = generate(&plan, &mut sink, &mut LabelBuilder, 7).await?;

        let placement: Vec<(usize, &str)> = sink
            .clients
            .iter()
            .map(|client| (client.secondary, client.kind.as_str()))
            .collect();
        let expected = [
            (0, "eu-clients"),
            (1, "eu-clients"),
            (0, "eu-clients"),
            (1, "us-clients"),
            (1, "us-clients"),
        ];
        if placement != expected {
            return Err(AppError::distributed(format!(
                "Unexpected placement: {:?}",
                placement
            )));
        }
        if summary.clients != 5 || sink.clients_on(2) != 0 {
            return Err(AppError::distributed("Unexpected client count"));
        }
        Ok(())
    })
}

#[test]
fn interactions_are_sent_in_global_offset_order() -> AppResult<()> {
    run_async_test(async {
        let slow = curve(&[(0.0, 3.0), (2.0, 0.0)])?;
        let fast = curve(&[(0.5, 7.0), (1.5, 0.0)])?;
        let expected_total = flatten_loads(&slow)
            .len()
            .saturating_add(flatten_loads(&fast).len())
            .saturating_mul(2);
        let plan = plan(vec![workload(
            "mixed",
            2,
            &[],
            2,
            vec![behavior("transfer", slow), behavior("invoke", fast)],
        )]);
        let mut sink = RecordingSink::new(&[&["eu"], &["us"]]);

        let summary = generate(&plan, &mut sink, &mut LabelBuilder, 1).await?;

        if sink.sent.len() != expected_total {
            return Err(AppError::distributed(format!(
                "Expected {} interactions, got {}",
                expected_total,
                sink.sent.len()
            )));
        }
        if usize::try_from(summary.interactions).ok() != Some(expected_total) {
            return Err(AppError::distributed("Summary count mismatch"));
        }
        let ordered = sink
            .sent
            .windows(2)
            .all(|pair| matches!(pair, [left, right] if left.offset <= right.offset));
        if !ordered {
            return Err(AppError::distributed("Interactions are not offset ordered"));
        }
        let last = sink.sent.last().map(|sent| sent.offset);
        if last != Some(summary.duration) {
            return Err(AppError::distributed("Duration should be the last offset"));
        }
        let kinds_ok = sink
            .sent
            .iter()
            .all(|sent| sent.kind == "transfer" || sent.kind == "invoke");
        if !kinds_ok {
            return Err(AppError::distributed("Unexpected interaction kind"));
        }
        Ok(())
    })
}

#[test]
fn sequences_count_per_client() -> AppResult<()> {
    run_async_test(async {
        let load = curve(&[(0.0, 4.0), (1.0, 0.0)])?;
        let plan = plan(vec![workload(
            "pair",
            2,
            &[],
            1,
            vec![behavior("transfer", load.clone()), behavior("invoke", load)],
        )]);
        let mut sink = RecordingSink::new(&[&[]]);

        generate(&plan, &mut sink, &mut LabelBuilder, 3).await?;

        for client in 0..2_usize {
            let labels: Vec<String> = sink
                .sent
                .iter()
                .filter(|sent| sent.client == client)
                .map(|sent| String::from_utf8_lossy(&sent.payload).into_owned())
                .collect();
            for (sequence, label) in labels.iter().enumerate() {
                let suffix = format!(":{}:{}", client, sequence);
                if !label.ends_with(&suffix) {
                    return Err(AppError::distributed(format!(
                        "Label {} does not end with {}",
                        label, suffix
                    )));
                }
            }
        }
        Ok(())
    })
}

#[test]
fn views_are_seeded_and_sized() -> AppResult<()> {
    run_async_test(async {
        let load = curve(&[(0.0, 1.0), (1.0, 0.0)])?;
        let plan = plan(vec![workload(
            "viewers",
            6,
            &[],
            2,
            vec![behavior("transfer", load)],
        )]);

        let mut first = RecordingSink::new(&[&[]]);
        generate(&plan, &mut first, &mut LabelBuilder, 42).await?;
        let mut second = RecordingSink::new(&[&[]]);
        generate(&plan, &mut second, &mut LabelBuilder, 42).await?;

        if first.clients != second.clients {
            return Err(AppError::distributed("Same seed should give same views"));
        }
        for client in &first.clients {
            let mut view = client.view.clone();
            view.sort();
            view.dedup();
            if view.len() != 2 {
                return Err(AppError::distributed(format!(
                    "Unexpected view: {:?}",
                    client.view
                )));
            }
        }
        Ok(())
    })
}

#[test]
fn unmatched_location_is_rejected() -> AppResult<()> {
    run_async_test(async {
        let load = curve(&[(0.0, 1.0), (1.0, 0.0)])?;
        let plan = plan(vec![workload(
            "lost",
            1,
            &["mars"],
            1,
            vec![behavior("transfer", load)],
        )]);
        let mut sink = RecordingSink::new(&[&["eu"]]);

        match generate(&plan, &mut sink, &mut LabelBuilder, 0).await {
            Err(AppError::Distributed(DistributedError::NoMatchingSecondary { tags }))
                if tags == ["mars"] =>
            {
                Ok(())
            }
            other => Err(AppError::distributed(format!(
                "Expected NoMatchingSecondary, got {:?}",
                other
            ))),
        }
    })
}

#[test]
fn builder_rejection_stops_generation() -> AppResult<()> {
    run_async_test(async {
        let load = curve(&[(0.0, 5.0), (1.0, 0.0)])?;
        let plan = plan(vec![workload(
            "bogus",
            1,
            &[],
            1,
            vec![behavior("teleport", load)],
        )]);
        let mut builder = MockSystem
            .builder(&plan.parameters, &[], &plan.endpoints)
            .map_err(AppError::adapter)?;
        let mut sink = RecordingSink::new(&[&[]]);

        match generate(&plan, &mut sink, builder.as_mut(), 0).await {
            Err(AppError::Adapter(AdapterError::UnsupportedInteraction { .. })) => {}
            other => {
                return Err(AppError::distributed(format!(
                    "Expected UnsupportedInteraction, got {:?}",
                    other
                )));
            }
        }
        if !sink.sent.is_empty() {
            return Err(AppError::distributed("Nothing should be sent"));
        }
        Ok(())
    })
}
