use tracing::info;

use crate::adapter::system_registry;
use crate::distributed::{run_primary, run_secondary};
use crate::error::AppResult;
use crate::results::{print_summary, summarize, write_results};

use super::RunPlan;

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    let registry = system_registry();
    match plan {
        RunPlan::Primary {
            options,
            plan,
            output,
        } => {
            info!(
                "Benchmarking '{}' with seed {} (systems: {})",
                plan.system,
                options.seed,
                registry.names_csv()
            );
            let result = run_primary(&options, &plan, registry).await?;
            write_results(&result, output.as_deref())?;
            print_summary(&summarize(&result));
            Ok(())
        }
        RunPlan::Secondary(options) => {
            let summary = run_secondary(&options, registry).await?;
            info!(
                "Session finished: {} clients, {} interactions",
                summary.clients, summary.interactions
            );
            Ok(())
        }
    }
}
