mod plan;


use std::ffi::OsString;

use clap::{CommandFactory, FromArgMatches};

use crate::args::CadenceArgs;
use crate::error::{AppError, AppResult};
use plan::{build_plan, execute_plan};

/// Parses the command line, initializes logging and runs the chosen role on
/// a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when the arguments are invalid or the role fails.
pub fn run() -> AppResult<()> {
    let args = match parse_args_from(std::env::args_os()) {
        Ok(args) => args,
        // Usage, help and version output goes through clap.
        Err(AppError::Clap { source }) => source.exit(),
        Err(err) => return Err(err),
    };

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args_from<I>(raw_args: I) -> AppResult<CadenceArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let matches = CadenceArgs::command().try_get_matches_from(raw_args)?;
    Ok(CadenceArgs::from_arg_matches(&matches)?)
}

async fn run_async(args: CadenceArgs) -> AppResult<()> {
    let plan = build_plan(args)?;
    execute_plan(plan).await
}
