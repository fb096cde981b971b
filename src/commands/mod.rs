pub mod auth;
pub mod calendar;

use weekcal_core::{CalendarClient, Config, CredentialStore, Endpoints};

/// Client for the production Google endpoints, persisting tokens to the config file.
fn client(config: &Config) -> CalendarClient {
    let endpoints = Endpoints::default();
    let credentials = CredentialStore::new(
        config.credentials.clone(),
        &endpoints,
        Some(config.path.clone()),
    );
    CalendarClient::new(credentials, endpoints)
}
