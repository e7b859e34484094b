use tracing::debug;

use crate::args::{CadenceArgs, Command, PrimaryArgs, SecondaryArgs};
use crate::config::load_plan;
use crate::distributed::{PrimaryOptions, SecondaryOptions};
use crate::error::AppResult;

use super::RunPlan;

pub(crate) fn build_plan(args: CadenceArgs) -> AppResult<RunPlan> {
    match args.command {
        Command::Primary(primary) => build_primary(primary),
        Command::Secondary(secondary) => Ok(RunPlan::Secondary(secondary_options(secondary))),
    }
}

fn build_primary(args: PrimaryArgs) -> AppResult<RunPlan> {
    let plan = load_plan(&args.config)?;
    debug!(
        "loaded plan for '{}' with {} workloads",
        plan.system,
        plan.workloads.len()
    );
    let options = PrimaryOptions {
        listen: args.listen,
        secondaries: args.secondaries.get(),
        max_delay: args.max_delay,
        max_skew: args.max_skew,
        seed: args.seed.unwrap_or_else(clock_seed),
        env: args.env,
    };
    Ok(RunPlan::Primary {
        options,
        plan,
        output: args.output,
    })
}

fn secondary_options(args: SecondaryArgs) -> SecondaryOptions {
    let decode_concurrency = args.decode_concurrency();
    SecondaryOptions {
        primary: args.primary,
        tags: args.tags,
        env: args.env,
        decode_concurrency,
        drain_timeout: args.drain_timeout,
    }
}

fn clock_seed() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|nanos| u64::try_from(nanos).ok())
        .unwrap_or_default()
}
