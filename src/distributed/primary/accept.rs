use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::adapter::SystemRegistry;
use crate::config::BenchmarkPlan;
use crate::distributed::protocol::{PrimaryParameters, SecondaryLink};
use crate::error::{AppError, AppResult, DistributedError};
use crate::results::BenchmarkResult;
use crate::workload::generate;

use super::coordinator::Coordinator;

/// How the primary listens for secondaries and times the benchmark.
#[derive(Debug, Clone)]
pub struct PrimaryOptions {
    pub listen: String,
    pub secondaries: usize,
    pub max_delay: f64,
    pub max_skew: f64,
    pub seed: u64,
    pub env: Vec<String>,
}

/// Binds the listen address and runs one benchmark of `plan`.
///
/// # Errors
///
/// Returns an error when binding fails or the benchmark cannot complete.
pub async fn run_primary(
    options: &PrimaryOptions,
    plan: &BenchmarkPlan,
    registry: &SystemRegistry,
) -> AppResult<BenchmarkResult> {
    let listener = TcpListener::bind(&options.listen).await.map_err(|err| {
        AppError::distributed(DistributedError::Bind {
            addr: options.listen.clone(),
            source: err,
        })
    })?;
    info!(
        "Primary listening on {} for {} secondaries",
        options.listen, options.secondaries
    );
    serve(listener, options, plan, registry).await
}

/// Runs one benchmark on an already bound listener.
///
/// # Errors
///
/// Returns an error when the plan names an unknown system, a secondary
/// misbehaves, or schedule generation fails.
pub async fn serve(
    listener: TcpListener,
    options: &PrimaryOptions,
    plan: &BenchmarkPlan,
    registry: &SystemRegistry,
) -> AppResult<BenchmarkResult> {
    let system = registry.system(&plan.system).ok_or_else(|| {
        AppError::distributed(DistributedError::UnknownSystem {
            name: plan.system.clone(),
        })
    })?;
    let mut builder = system
        .builder(&plan.parameters, &options.env, &plan.endpoints)
        .map_err(AppError::adapter)?;

    let params = PrimaryParameters {
        sysname: plan.system.clone(),
        params: plan.parameters.clone(),
        max_delay: options.max_delay,
        max_skew: options.max_skew,
    };
    let mut coordinator =
        accept_secondaries(&listener, options.secondaries, params, options.seed).await?;
    drop(listener);
    coordinator.seal()?;

    let generated = generate(plan, &mut coordinator, builder.as_mut(), options.seed).await?;
    debug!("generated {:?}", generated);
    coordinator.run().await
}

/// Accepts `count` secondaries and negotiates parameters with each one in
/// connection order.
///
/// # Errors
///
/// Returns an error when accepting or negotiating fails.
pub async fn accept_secondaries(
    listener: &TcpListener,
    count: usize,
    params: PrimaryParameters,
    seed: u64,
) -> AppResult<Coordinator<TcpStream>> {
    let mut coordinator = Coordinator::new(params, seed);
    while coordinator.secondary_count() < count {
        let (stream, peer) = listener.accept().await.map_err(|err| {
            AppError::distributed(DistributedError::Io {
                context: "accept secondary",
                source: err,
            })
        })?;
        if let Err(err) = stream.set_nodelay(true) {
            debug!("Failed to disable Nagle for {}: {}", peer, err);
        }
        let link = SecondaryLink::new(stream, peer.to_string());
        coordinator.add_secondary(link).await?;
        info!(
            "{} of {} secondaries connected",
            coordinator.secondary_count(),
            count
        );
    }
    Ok(coordinator)
}
