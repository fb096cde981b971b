//! Time window for listing events.

use chrono::{DateTime, Duration, Utc};

use crate::error::ApiError;

pub const DAYS_PER_WEEK: i64 = 7;

/// How far ahead of "now" to list events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    days: i64,
}

impl Default for ListWindow {
    /// One week.
    fn default() -> Self {
        ListWindow {
            days: DAYS_PER_WEEK,
        }
    }
}

impl ListWindow {
    /// `weeks * 7` days. Zero or negative counts are rejected before any
    /// request is made.
    pub fn weeks(weeks: i64) -> Result<Self, ApiError> {
        if weeks <= 0 {
            return Err(ApiError::InvalidWindow(weeks));
        }
        let days = weeks
            .checked_mul(DAYS_PER_WEEK)
            .ok_or(ApiError::InvalidWindow(weeks))?;
        Ok(ListWindow { days })
    }

    /// Window for an optional week count (default one week).
    pub fn from_weeks(weeks: Option<i64>) -> Result<Self, ApiError> {
        weeks.map_or(Ok(Self::default()), Self::weeks)
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    /// `[now, now + days)`, saturating at the latest representable time.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = Duration::try_days(self.days)
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (now, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_is_one_week() {
        assert_eq!(ListWindow::default().days(), 7);
        assert_eq!(ListWindow::from_weeks(None).unwrap().days(), 7);
    }

    #[test]
    fn test_weeks() {
        assert_eq!(ListWindow::weeks(3).unwrap().days(), 21);
        assert_eq!(ListWindow::from_weeks(Some(2)).unwrap().days(), 14);
    }

    #[test]
    fn test_non_positive_weeks_rejected() {
        assert!(matches!(ListWindow::weeks(0), Err(ApiError::InvalidWindow(0))));
        assert!(matches!(
            ListWindow::from_weeks(Some(-1)),
            Err(ApiError::InvalidWindow(-1))
        ));
        assert!(ListWindow::weeks(i64::MAX).is_err());
    }

    #[test]
    fn test_bounds() {
        let now = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let (from, to) = ListWindow::default().bounds(now);
        assert_eq!(from, now);
        assert_eq!(to, Utc.with_ymd_and_hms(2025, 3, 27, 12, 0, 0).unwrap());

        let (_, far) = ListWindow::weeks(i64::MAX / 8).unwrap().bounds(now);
        assert_eq!(far, DateTime::<Utc>::MAX_UTC);
    }
}
