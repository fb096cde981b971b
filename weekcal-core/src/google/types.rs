//! Google Calendar v3 wire types and their conversion to [`Event`].
//!
//! Only the fields weekcal reads or writes are modelled; serde ignores the
//! rest of Google's event resource.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::event::{Event, EventTime};

/// Response of `GET /calendars/{id}/events`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// An event resource as returned by Google.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: GoogleEventTime,
    #[serde(default)]
    pub end: GoogleEventTime,
}

/// `start`/`end` object. All-day events carry `date` instead of `dateTime`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Body of create (POST) and update (PATCH) requests.
///
/// The event id is never part of the body.
#[derive(Debug, Serialize)]
pub struct EventPayload {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: GoogleEventTime,
    pub end: GoogleEventTime,
}

impl From<&Event> for EventPayload {
    fn from(event: &Event) -> Self {
        let time = |t: &EventTime| GoogleEventTime {
            date_time: Some(t.to_rfc3339()),
            date: None,
        };

        EventPayload {
            summary: event.summary.clone(),
            location: event.location.clone().filter(|l| !l.is_empty()),
            start: time(&event.start),
            end: time(&event.end),
        }
    }
}

fn parse_time(time: &GoogleEventTime) -> Result<EventTime, ApiError> {
    let raw = time.date_time.as_deref().unwrap_or_default();
    EventTime::parse(raw).ok_or_else(|| ApiError::MalformedTimestamp {
        value: raw.to_string(),
    })
}

impl TryFrom<GoogleEvent> for Event {
    type Error = ApiError;

    fn try_from(event: GoogleEvent) -> Result<Self, Self::Error> {
        let start = parse_time(&event.start)?;
        let end = parse_time(&event.end)?;

        Ok(Event {
            id: event.id,
            summary: event.summary,
            location: event.location.filter(|l| !l.is_empty()),
            start,
            end,
        })
    }
}
