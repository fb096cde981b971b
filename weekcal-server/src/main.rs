use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use weekcal_core::{CalendarClient, Config, ConfigError, CredentialStore, Endpoints};
use weekcal_server::RelayServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e @ ConfigError::Created(_)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load config"),
    };

    let endpoints = Endpoints::default();
    let credentials = CredentialStore::new(config.credentials, &endpoints, Some(config.path));
    let client = CalendarClient::new(credentials, endpoints);

    let relay = RelayServer::new(client, config.port).start().await?;
    println!("weekcal-relay listening on {}", relay.base_url());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    relay.stop().await
}
