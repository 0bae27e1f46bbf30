// Entrypoint: set up logging, read configuration and run the flow chosen
// on the command line. Upload failures exit non-zero; a keepalive sweep
// exits zero even when individual visits fail.

use clap::{CommandFactory, Parser};
use pxlkeep::{api::HostClient, cli::Cli, config::Config, store::StateStore, ui};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if !cli.has_action() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");
    let client = HostClient::from_config(&config)?;
    let store = StateStore::new(config.state_file.clone());

    match cli.upload {
        Some(path) => {
            ui::upload(&client, &store, &path)?;
        }
        None => ui::keepalive(&client, &store, config.visit_interval_days)?,
    }
    Ok(())
}
