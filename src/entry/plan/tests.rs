use std::time::Duration;

use clap::Parser;
use tempfile::tempdir;

use super::{RunPlan, build_plan};
use crate::args::CadenceArgs;
use crate::error::{AppError, AppResult, ConfigError};

const PLAN: &str = r#"
system = "mock"

[[endpoints]]
addresses = ["node:7000"]

[[workloads]]
name = "wallets"

[[workloads.behaviors]]
interaction = "transfer"
load = { "0" = 1.0, "2" = 0.0 }
"#;

#[test]
fn primary_plan_loads_config_and_keeps_seed() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("plan.toml");
    std::fs::write(&path, PLAN)?;
    let path_arg = path.to_string_lossy().into_owned();
    let args = CadenceArgs::try_parse_from([
        "cadence",
        "primary",
        "--config",
        path_arg.as_str(),
        "--secondaries",
        "2",
        "--seed",
        "11",
        "--env",
        "k=v",
    ])?;

    match build_plan(args)? {
        RunPlan::Primary {
            options,
            plan,
            output,
        } => {
            if options.seed != 11 || options.secondaries != 2 || options.env != ["k=v"] {
                return Err(AppError::config(format!("Unexpected options: {:?}", options)));
            }
            if plan.system != "mock" || plan.workloads.len() != 1 {
                return Err(AppError::config("Unexpected plan"));
            }
            if output.is_some() {
                return Err(AppError::config("Output should default to none"));
            }
            Ok(())
        }
        RunPlan::Secondary(_) => Err(AppError::config("Expected a primary plan")),
    }
}

#[test]
fn primary_plan_reports_missing_config() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("absent.toml");
    let path_arg = path.to_string_lossy().into_owned();
    let args = CadenceArgs::try_parse_from([
        "cadence",
        "primary",
        "--config",
        path_arg.as_str(),
        "--secondaries",
        "1",
    ])?;
    match build_plan(args) {
        Err(AppError::Config(ConfigError::ReadConfig { .. })) => Ok(()),
        _ => Err(AppError::config("Expected ReadConfig error")),
    }
}

#[test]
fn secondary_plan_carries_cli_values() -> AppResult<()> {
    let args = CadenceArgs::try_parse_from([
        "cadence",
        "secondary",
        "--primary",
        "127.0.0.1:8323",
        "--tag",
        "eu",
        "--decode-concurrency",
        "3",
        "--drain-timeout",
        "2",
    ])?;
    match build_plan(args)? {
        RunPlan::Secondary(options) => {
            if options.primary != "127.0.0.1:8323" || options.tags != ["eu"] {
                return Err(AppError::config("Unexpected primary or tags"));
            }
            if options.decode_concurrency != 3 || options.drain_timeout != Duration::from_secs(2) {
                return Err(AppError::config("Unexpected preparation settings"));
            }
            Ok(())
        }
        RunPlan::Primary { .. } => Err(AppError::config("Expected a secondary plan")),
    }
}
