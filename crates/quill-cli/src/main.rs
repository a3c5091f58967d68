use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod logging;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.resolve_config()?;
    logging::init(&config.log_level, cli.verbose)?;
    debug!(
        config = %cli.config.display(),
        store = %config.store_dir.display(),
        root = %config.root_file.display(),
        "resolved config"
    );
    commands::run_command(cli, config)
}
