mod build;
mod execute;

#[cfg(test)]
mod tests;

pub(super) use build::build_plan;
pub(super) use execute::execute_plan;

use std::path::PathBuf;

use crate::config::BenchmarkPlan;
use crate::distributed::{PrimaryOptions, SecondaryOptions};

/// What the process will do once arguments are resolved.
#[derive(Debug)]
pub(crate) enum RunPlan {
    Primary {
        options: PrimaryOptions,
        plan: BenchmarkPlan,
        output: Option<PathBuf>,
    },
    Secondary(SecondaryOptions),
}
