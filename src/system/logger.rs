use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Variable read before `RUST_LOG` to pick the log filter.
const LOG_ENV: &str = "CADENCE_LOG";

pub fn init_logging(verbose: bool, no_color: bool) {
    let configured = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();
    let filter = resolve_filter(configured.as_deref(), verbose);

    // Logs go to stderr so the summary on stdout stays machine readable.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

fn resolve_filter(configured: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = || {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    };
    configured.map_or_else(fallback, |value| {
        EnvFilter::try_new(value).unwrap_or_else(|_| fallback())
    })
}
