//! The event model shared by the API client, the relay and the terminal UI.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A calendar event.
///
/// `id` is assigned by the remote calendar and stays empty until the event
/// has been created there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

/// A point in time with the UTC offset it was expressed in.
///
/// The calendar date is always derived from the date-time, never stored on
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: DateTime<FixedOffset>,
}

impl EventTime {
    pub fn new(date_time: DateTime<FixedOffset>) -> Self {
        EventTime { date_time }
    }

    /// Parse an RFC 3339 timestamp such as `2025-03-20T15:00:00+01:00`.
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s).ok().map(EventTime::new)
    }

    pub fn date(&self) -> NaiveDate {
        self.date_time.date_naive()
    }

    pub fn time(&self) -> NaiveTime {
        self.date_time.time()
    }

    pub fn offset(&self) -> FixedOffset {
        *self.date_time.offset()
    }

    /// The same instant expressed in another offset.
    pub fn in_offset(&self, offset: FixedOffset) -> Self {
        EventTime::new(self.date_time.with_timezone(&offset))
    }

    pub fn to_rfc3339(&self) -> String {
        self.date_time.to_rfc3339()
    }
}

impl Event {
    pub fn new(summary: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Event {
            id: String::new(),
            summary: summary.into(),
            location: None,
            start,
            end,
        }
    }

    pub fn is_created(&self) -> bool {
        !self.id.is_empty()
    }

    /// "HH:MM-HH:MM" in the event's own offset.
    pub fn time_range(&self) -> String {
        format!(
            "{}-{}",
            self.start.date_time.format("%H:%M"),
            self.end.date_time.format("%H:%M")
        )
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary)
    }
}
