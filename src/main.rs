mod commands;
mod logging;
mod tui;

use anyhow::Result;
use clap::Parser;
use weekcal_core::{Config, ConfigError};

#[derive(Parser)]
#[command(name = "weekcal")]
#[command(about = "A week view of your Google Calendar in the terminal")]
struct Cli {
    /// Authorize weekcal with Google in your browser instead of opening the calendar
    #[arg(short, long)]
    auth: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e @ ConfigError::Created(_)) => {
            println!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    logging::init(&config.path)?;

    if cli.auth {
        commands::auth::run(&config).await
    } else {
        commands::calendar::run(&config).await
    }
}
