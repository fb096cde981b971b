use anyhow::{Context, Result};
use weekcal_core::Config;
use weekcal_server::RelayServer;

pub async fn run(config: &Config) -> Result<()> {
    let relay = RelayServer::new(super::client(config), config.port)
        .start()
        .await
        .context("Failed to start the local relay for the authorization callback")?;

    let auth_url = format!("{}/auth/google", relay.base_url());
    println!("\nOpen this URL in your browser to authorize weekcal:\n");
    println!("{}\n", auth_url);

    // Try to open the browser automatically
    if open::that(&auth_url).is_err() {
        println!("(Could not open browser automatically, please copy the URL above)");
    }

    let authorized = tokio::select! {
        _ = relay.authorized() => true,
        _ = tokio::signal::ctrl_c() => false,
    };

    relay.stop().await?;

    if authorized {
        println!("Authorization successful! Tokens saved to {}", config.path.display());
        println!("\nRun `weekcal` to open your calendar.");
    } else {
        println!("Authorization cancelled.");
    }

    Ok(())
}
