use std::collections::BTreeMap;
use std::time::Duration;

use tokio::net::TcpListener;

use super::primary::{Coordinator, ScheduleSink, accept_secondaries};
use super::protocol::PrimaryParameters;
use super::secondary::{SecondaryOptions, run_secondary};
use crate::adapter::{
    Endpoints, InteractionInfo, MockSystem, SystemParams, TargetSystem, system_registry,
};
use crate::error::{AppError, AppResult};
use crate::test_support::{approx_eq, run_multi_thread_test};

fn mock_params() -> SystemParams {
    let mut params = BTreeMap::new();
    params.insert("delay".to_owned(), "0.01".to_owned());
    params
}

fn secondary_options(primary: String) -> SecondaryOptions {
    SecondaryOptions {
        primary,
        tags: vec!["loopback".to_owned()],
        env: Vec::new(),
        decode_concurrency: 4,
        drain_timeout: Duration::from_secs(5),
    }
}

async fn loopback_listener() -> AppResult<(TcpListener, String)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    Ok((listener, addr))
}

#[test]
fn loopback_benchmark_reports_every_interaction() -> AppResult<()> {
    run_multi_thread_test(async {
        let (listener, addr) = loopback_listener().await?;
        let secondary = tokio::spawn(async move {
            run_secondary(&secondary_options(addr), system_registry()).await
        });

        let params = PrimaryParameters {
            sysname: "mock".to_owned(),
            params: mock_params(),
            max_delay: 0.5,
            max_skew: 0.5,
        };
        let mut coordinator: Coordinator<_> = accept_secondaries(&listener, 1, params, 5).await?;
        coordinator.seal()?;

        let tags_ok = coordinator
            .locations()
            .first()
            .is_some_and(|location| location.tags.first().map(String::as_str) == Some("loopback"));
        if !tags_ok {
            return Err(AppError::distributed("Secondary tags should be negotiated"));
        }

        let mut builder = MockSystem
            .builder(&mock_params(), &[], &Endpoints::new())
            .map_err(AppError::adapter)?;
        let client = coordinator
            .create_client(0, "wallet", vec!["node:7000".to_owned()])
            .await?;
        for (sequence, offset) in [0.0, 1.0, 2.0].into_iter().enumerate() {
            let info = InteractionInfo {
                client: 0,
                sequence: u64::try_from(sequence).unwrap_or_default(),
            };
            let payload = builder
                .encode_interaction("transfer", &info)
                .map_err(AppError::adapter)?;
            coordinator
                .send_interaction(0, client, "transfer", offset, payload)
                .await?;
        }

        let result = coordinator.run().await?;
        let summary = secondary.await??;
        if summary.clients != 1 || summary.interactions != 3 {
            return Err(AppError::distributed(format!(
                "Unexpected secondary summary: {:?}",
                summary
            )));
        }

        let interactions: Vec<_> = result.interactions().collect();
        if interactions.len() != 3 {
            return Err(AppError::distributed(format!(
                "Expected 3 results, got {}",
                interactions.len()
            )));
        }
        for (index, (client, interaction)) in interactions.iter().enumerate() {
            if client.kind != "wallet" || interaction.kind != "transfer" {
                return Err(AppError::distributed("Unexpected kinds in result"));
            }
            if interaction.has_error || interaction.abort_time.is_some() {
                return Err(AppError::distributed("Interaction should succeed"));
            }
            let submit = interaction
                .submit_time
                .ok_or_else(|| AppError::distributed("Missing submit time"))?;
            let latency = interaction
                .latency()
                .ok_or_else(|| AppError::distributed("Missing commit time"))?;
            let scheduled = f64::from(u32::try_from(index).unwrap_or_default());
            if !approx_eq(submit, scheduled, 0.25) {
                return Err(AppError::distributed(format!(
                    "Interaction {} submitted at {}",
                    index, submit
                )));
            }
            if !(0.009..0.25).contains(&latency) {
                return Err(AppError::distributed(format!(
                    "Interaction {} latency {}",
                    index, latency
                )));
            }
        }
        Ok(())
    })
}

#[test]
fn secondary_reports_unreachable_primary() -> AppResult<()> {
    run_multi_thread_test(async {
        let (listener, addr) = loopback_listener().await?;
        drop(listener);
        match run_secondary(&secondary_options(addr), system_registry()).await {
            Err(AppError::Distributed(crate::error::DistributedError::Connection { .. })) => Ok(()),
            other => Err(AppError::distributed(format!(
                "Expected a connection error, got {:?}",
                other
            ))),
        }
    })
}
