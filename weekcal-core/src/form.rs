//! Text fields of the event form and their conversion to an [`Event`].

use chrono::{Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::event::{Event, EventTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// An editable field of the event form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Title,
    Date,
    Start,
    End,
    Location,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Date,
        Field::Start,
        Field::End,
        Field::Location,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Event:",
            Field::Date => "Date (YYYY-MM-DD):",
            Field::Start => "Start Time (HH:MM):",
            Field::End => "End Time (HH:MM):",
            Field::Location => "Location:",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Field::Title => 0,
            Field::Date => 1,
            Field::Start => 2,
            Field::End => 3,
            Field::Location => 4,
        }
    }
}

/// Raw text of every form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub date: String,
    pub start: String,
    pub end: String,
    pub location: String,
    /// Days between the start date and the end date. Not shown in the form;
    /// seeded from an existing event so multi-day events keep their end day.
    pub end_days: u64,
}

impl FormValues {
    /// Blank form for a new event on `date`.
    pub fn for_new_event(date: NaiveDate) -> Self {
        FormValues {
            date: date.format(DATE_FORMAT).to_string(),
            ..Default::default()
        }
    }

    /// Form seeded from an existing event, with its times shown in `offset`.
    pub fn from_event(event: &Event, offset: FixedOffset) -> Self {
        let start = event.start.in_offset(offset);
        let end = event.end.in_offset(offset);

        FormValues {
            title: event.summary.clone(),
            date: start.date().format(DATE_FORMAT).to_string(),
            start: start.time().format(TIME_FORMAT).to_string(),
            end: end.time().format(TIME_FORMAT).to_string(),
            location: event.location.clone().unwrap_or_default(),
            end_days: (end.date() - start.date()).num_days().max(0) as u64,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Date => &self.date,
            Field::Start => &self.start,
            Field::End => &self.end,
            Field::Location => &self.location,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Date => &mut self.date,
            Field::Start => &mut self.start,
            Field::End => &mut self.end,
            Field::Location => &mut self.location,
        }
    }

    /// Check every field and assemble an event whose times are in `offset`.
    ///
    /// All invalid fields are reported at once. The returned event has an
    /// empty id; the caller fills it in for updates.
    pub fn to_event(&self, offset: FixedOffset) -> Result<Event, ValidationError> {
        let mut invalid = Vec::new();

        if self.title.trim().is_empty() {
            invalid.push(Field::Title);
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok();
        if date.is_none() {
            invalid.push(Field::Date);
        }

        let start = NaiveTime::parse_from_str(self.start.trim(), TIME_FORMAT).ok();
        if start.is_none() {
            invalid.push(Field::Start);
        }

        let end = NaiveTime::parse_from_str(self.end.trim(), TIME_FORMAT).ok();
        if end.is_none() {
            invalid.push(Field::End);
        }

        let (Some(date), Some(start), Some(end)) = (date, start, end) else {
            return Err(ValidationError { fields: invalid });
        };

        let Some(end_date) = date.checked_add_days(Days::new(self.end_days)) else {
            invalid.push(Field::Date);
            return Err(ValidationError { fields: invalid });
        };

        let start = date.and_time(start);
        let end = end_date.and_time(end);
        if end < start {
            invalid.push(Field::End);
        }

        if !invalid.is_empty() {
            return Err(ValidationError { fields: invalid });
        }

        let at = |time: NaiveDateTime| {
            time.and_local_timezone(offset).single().map(EventTime::new)
        };

        let (Some(start), Some(end)) = (at(start), at(end)) else {
            return Err(ValidationError {
                fields: vec![Field::Date],
            });
        };

        let location = self.location.trim();

        Ok(Event {
            id: String::new(),
            summary: self.title.trim().to_string(),
            location: (!location.is_empty()).then(|| location.to_string()),
            start,
            end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn filled() -> FormValues {
        FormValues {
            title: "Dentist".into(),
            date: "2025-03-20".into(),
            start: "14:00".into(),
            end: "15:30".into(),
            location: "Main St".into(),
            end_days: 0,
        }
    }

    #[test]
    fn test_valid_form_builds_event() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let event = filled().to_event(offset).unwrap();

        assert_eq!(event.summary, "Dentist");
        assert_eq!(event.location.as_deref(), Some("Main St"));
        assert_eq!(event.start.to_rfc3339(), "2025-03-20T14:00:00+02:00");
        assert_eq!(event.end.to_rfc3339(), "2025-03-20T15:30:00+02:00");
        assert!(event.id.is_empty());
    }

    #[test]
    fn test_start_time_out_of_range_is_flagged() {
        let mut form = filled();
        form.start = "25:00".into();

        let err = form.to_event(utc()).unwrap_err();
        assert_eq!(err.fields, vec![Field::Start]);
    }

    #[test]
    fn test_all_invalid_fields_reported() {
        let form = FormValues {
            title: "   ".into(),
            date: "20-03-2025".into(),
            start: "9am".into(),
            end: "".into(),
            location: String::new(),
            end_days: 0,
        };

        let err = form.to_event(utc()).unwrap_err();
        assert_eq!(
            err.fields,
            vec![Field::Title, Field::Date, Field::Start, Field::End]
        );
    }

    #[test]
    fn test_end_before_start_is_flagged() {
        let mut form = filled();
        form.end = "13:00".into();

        let err = form.to_event(utc()).unwrap_err();
        assert_eq!(err.fields, vec![Field::End]);
    }

    #[test]
    fn test_empty_location_is_none() {
        let mut form = filled();
        form.location = "  ".into();
        assert_eq!(form.to_event(utc()).unwrap().location, None);
    }

    #[test]
    fn test_seed_from_event_converts_offset() {
        let event = Event::new(
            "Call",
            EventTime::parse("2025-03-20T23:00:00-05:00").unwrap(),
            EventTime::parse("2025-03-20T23:45:00-05:00").unwrap(),
        );

        let form = FormValues::from_event(&event, utc());
        assert_eq!(form.date, "2025-03-21");
        assert_eq!(form.start, "04:00");
        assert_eq!(form.end, "04:45");
        assert_eq!(form.location, "");
    }

    #[test]
    fn test_seed_keeps_end_day_of_multi_day_event() {
        let event = Event::new(
            "Conference",
            EventTime::parse("2025-03-20T09:00:00Z").unwrap(),
            EventTime::parse("2025-03-22T17:00:00Z").unwrap(),
        );

        let form = FormValues::from_event(&event, utc());
        assert_eq!(form.end_days, 2);

        let rebuilt = form.to_event(utc()).unwrap();
        assert_eq!(rebuilt.start, event.start);
        assert_eq!(rebuilt.end, event.end);
    }

    #[test]
    fn test_overnight_event_end_before_start_time_is_valid() {
        let mut form = filled();
        form.start = "22:00".into();
        form.end = "01:00".into();
        form.end_days = 1;

        let event = form.to_event(utc()).unwrap();
        assert_eq!(event.end.to_rfc3339(), "2025-03-21T01:00:00+00:00");
    }

    #[test]
    fn test_new_event_prefills_date_only() {
        let form = FormValues::for_new_event(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(form.date, "2025-01-02");
        assert!(form.title.is_empty() && form.start.is_empty());
    }
}
