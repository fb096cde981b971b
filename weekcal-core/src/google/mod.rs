//! Google Calendar v3 client.
//!
//! Every call is made with the access token currently held by the
//! [`CredentialStore`]. A 401 is reported as [`ApiError::Unauthorized`] and
//! never retried here; see [`crate::retry::with_refresh`] for the single
//! refresh-and-retry.

pub mod oauth;
pub mod types;

use chrono::{SecondsFormat, Utc};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::event::Event;
use crate::window::ListWindow;

use self::types::{EventPayload, GoogleEvent, GoogleEventList};

pub const CALENDAR_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub calendar_base: String,
    pub token_url: String,
    pub auth_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            calendar_base: CALENDAR_BASE.to_string(),
            token_url: TOKEN_URL.to_string(),
            auth_url: AUTH_URL.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    credentials: CredentialStore,
}

impl CalendarClient {
    pub fn new(credentials: CredentialStore, endpoints: Endpoints) -> Self {
        Self::with_http(reqwest::Client::new(), credentials, endpoints)
    }

    pub fn with_http(http: reqwest::Client, credentials: CredentialStore, endpoints: Endpoints) -> Self {
        CalendarClient {
            http,
            endpoints,
            credentials,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Events starting in `[now, now + window)`, ordered by start time, with
    /// recurring events expanded by Google.
    ///
    /// One unparseable timestamp fails the whole call.
    pub async fn list(&self, window: ListWindow) -> Result<Vec<Event>, ApiError> {
        let (time_min, time_max) = window.bounds(Utc::now());
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = time_max.to_rfc3339_opts(SecondsFormat::Secs, true);
        let url = self.events_url(None);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let response = {
                let mut query = vec![
                    ("timeMin", time_min.as_str()),
                    ("timeMax", time_max.as_str()),
                    ("orderBy", "startTime"),
                    ("singleEvents", "true"),
                ];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }

                self.http
                    .get(&url)
                    .bearer_auth(self.credentials.current_access_token())
                    .query(&query)
                    .send()
                    .await?
            };
            let page: GoogleEventList = check("list", response).await?.json().await?;

            for item in page.items {
                events.push(Event::try_from(item).inspect_err(|e| warn!("list: {}", e))?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Listed {} events over {} days", events.len(), window.days());
        Ok(events)
    }

    /// Create `event` and return it as stored remotely (with its new id).
    pub async fn create(&self, event: &Event) -> Result<Event, ApiError> {
        let response = self
            .http
            .post(self.events_url(None))
            .bearer_auth(self.credentials.current_access_token())
            .json(&EventPayload::from(event))
            .send()
            .await?;
        let created: GoogleEvent = check("create", response).await?.json().await?;
        let created = Event::try_from(created)?;

        info!("Created event {} ({})", created.id, created.summary);
        Ok(created)
    }

    /// Patch summary, location and times of an existing event.
    pub async fn update(&self, event: &Event) -> Result<(), ApiError> {
        if event.id.is_empty() {
            return Err(ApiError::MissingEventId);
        }

        let response = self
            .http
            .patch(self.events_url(Some(&event.id)))
            .bearer_auth(self.credentials.current_access_token())
            .json(&EventPayload::from(event))
            .send()
            .await?;
        check("update", response).await?;

        info!("Updated event {}", event.id);
        Ok(())
    }

    pub async fn delete(&self, event_id: &str) -> Result<(), ApiError> {
        if event_id.is_empty() {
            return Err(ApiError::MissingEventId);
        }

        let response = self
            .http
            .delete(self.events_url(Some(event_id)))
            .bearer_auth(self.credentials.current_access_token())
            .send()
            .await?;
        check("delete", response).await?;

        info!("Deleted event {}", event_id);
        Ok(())
    }

    fn events_url(&self, event_id: Option<&str>) -> String {
        let base = self.endpoints.calendar_base.trim_end_matches('/');
        let calendar = encode_segment(&self.credentials.calendar_id());

        match event_id {
            Some(id) => format!("{}/calendars/{}/events/{}", base, calendar, encode_segment(id)),
            None => format!("{}/calendars/{}/events", base, calendar),
        }
    }
}

/// Map 401 and other non-2xx statuses to errors.
async fn check(op: &str, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        warn!("{}: calendar API returned 401", op);
        return Err(ApiError::Unauthorized);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("{}: calendar API returned {}: {}", op, status, body);
        return Err(ApiError::RemoteRejected {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

/// Percent-encode one URL path segment.
fn encode_segment(segment: &str) -> String {
    // form encoding writes spaces as '+' and a literal '+' as %2B
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
