use anyhow::{Context, Result};
use tracing::{info, warn};
use weekcal_core::{Config, ListWindow, with_refresh};
use weekcal_server::RelayServer;

use crate::tui::{self, ui::Theme};

pub async fn run(config: &Config) -> Result<()> {
    let client = super::client(config);

    client
        .credentials()
        .refresh()
        .await
        .context("Could not refresh the Google access token. Run `weekcal --auth` to authorize again")?;

    let events = with_refresh(client.credentials(), || client.list(ListWindow::default()))
        .await
        .context("Failed to load events")?;
    info!("Loaded {} events", events.len());

    // The relay shares our credentials; a busy port only costs local clients
    let relay = match RelayServer::new(client.clone(), config.port).start().await {
        Ok(relay) => Some(relay),
        Err(e) => {
            warn!("Relay not started: {:#}", e);
            None
        }
    };

    let result = tui::run(client, Theme::from_colors(&config.colors), events).await;

    if let Some(relay) = relay {
        relay.stop().await?;
    }

    result
}
