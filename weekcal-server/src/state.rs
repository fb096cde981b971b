use std::sync::Arc;

use tokio::sync::Notify;
use weekcal_core::{CalendarClient, CredentialStore};

/// Shared relay state
#[derive(Clone)]
pub struct RelayState {
    client: CalendarClient,
    redirect_uri: String,
    authorized: Arc<Notify>,
}

impl RelayState {
    pub fn new(client: CalendarClient, redirect_uri: String, authorized: Arc<Notify>) -> Self {
        RelayState {
            client,
            redirect_uri,
            authorized,
        }
    }

    pub fn client(&self) -> &CalendarClient {
        &self.client
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.client.credentials()
    }

    /// Where Google sends the browser back after consent.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Wake whoever is waiting for the browser authorization to finish.
    pub fn signal_authorized(&self) {
        self.authorized.notify_one();
    }
}
