use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use solswap::application::{Cli, CommandExecutor};
use solswap::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --log-level > RUST_LOG > info
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Priority: CLI args > config file > defaults
    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    CommandExecutor::execute(cli.command, config).await?;
    Ok(())
}
