use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "QUILL_LOG";

/// Pick the filter: `QUILL_LOG` wins, then `--verbose`, then the configured level.
pub fn build_env_filter(level: &str, verbose: bool) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    let level = if verbose { "debug" } else { level };
    Ok(EnvFilter::try_new(level)?)
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init(level: &str, verbose: bool) -> anyhow::Result<()> {
    let filter = build_env_filter(level, verbose)?;
    Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
