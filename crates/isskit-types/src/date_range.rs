//! Date ranges for history and candle queries.

use chrono::{NaiveDate, TimeDelta};

use crate::DateRangeError;

/// Default lookback, in days, for history queries without an explicit range.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// A range of dates for data retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a date range for a single day.
    #[must_use]
    pub const fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Creates the range of `days` days ending on `end`.
    #[must_use]
    pub fn ending_on(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - TimeDelta::days(days.max(0)),
            end,
        }
    }

    /// Resolves optional bounds against `today`.
    ///
    /// A missing end defaults to `today`; a missing start defaults to
    /// [`DEFAULT_LOOKBACK_DAYS`] before today.
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved start is after the resolved end.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, DateRangeError> {
        let start = start.unwrap_or(today - TimeDelta::days(DEFAULT_LOOKBACK_DAYS));
        let end = end.unwrap_or(today);
        Self::new(start, end)
    }

    /// Returns the total number of days in the range.
    #[must_use]
    pub fn total_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Returns true if the range contains the given date.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_new() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 1, 31));
        assert_eq!(range.total_days(), 31);
    }

    #[test]
    fn test_date_range_invalid() {
        assert!(DateRange::new(date(2024, 1, 31), date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_ending_on() {
        let range = DateRange::ending_on(date(2024, 3, 31), 30);
        assert_eq!(range.start, date(2024, 3, 1));
        assert!(range.contains(date(2024, 3, 15)));
        assert!(!range.contains(date(2024, 2, 29)));
    }

    #[test]
    fn test_resolve_defaults() {
        let today = date(2024, 6, 30);
        let range = DateRange::resolve(None, None, today).unwrap();
        assert_eq!(range.end, today);
        assert_eq!(range.start, date(2024, 5, 31));

        let explicit = DateRange::resolve(Some(date(2024, 1, 1)), None, today).unwrap();
        assert_eq!(explicit.start, date(2024, 1, 1));
        assert!(DateRange::resolve(Some(date(2025, 1, 1)), None, today).is_err());
    }
}
