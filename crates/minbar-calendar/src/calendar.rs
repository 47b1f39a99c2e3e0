//! Ordered set of trading days.

use std::path::PathBuf;

use minbar_types::{MinbarError, TradingDay};
use thiserror::Error;

/// Errors raised by calendar queries and loading.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// No trading day satisfies the query.
    #[error("No trading day {direction} {day}")]
    NotFound {
        /// Day the query was anchored on.
        day: TradingDay,
        /// `"before"` or `"after"`.
        direction: &'static str,
    },

    /// The anchor day is not a trading day.
    #[error("{0} is not a trading day")]
    NotTradingDay(TradingDay),

    /// A calendar row carries an unparseable date.
    #[error("Invalid date '{value}' on calendar line {line}")]
    InvalidDay {
        /// 1-based line number.
        line: u64,
        /// Offending value.
        value: String,
    },

    /// The calendar file could not be read.
    #[error("Failed to read calendar '{}': {source}", path.display())]
    Read {
        /// Calendar path.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Malformed CSV.
    #[error("Calendar CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<CalendarError> for MinbarError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::NotTradingDay(day) => Self::DayNotInCalendar(day),
            other => Self::Calendar(other.to_string()),
        }
    }
}

/// Immutable, ascending set of trading days.
///
/// Built once at startup and shared read-only (wrap it in an `Arc` to hand
/// it to concurrent consumers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradingCalendar {
    days: Vec<TradingDay>,
}

impl TradingCalendar {
    /// Builds a calendar from `(day, is_trading_day)` records.
    ///
    /// Only records flagged as trading days are kept; order and duplicates in
    /// the input do not matter.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (TradingDay, bool)>,
    {
        Self::from_days(
            records
                .into_iter()
                .filter_map(|(day, trading)| trading.then_some(day)),
        )
    }

    /// Builds a calendar from trading days.
    pub fn from_days<I>(days: I) -> Self
    where
        I: IntoIterator<Item = TradingDay>,
    {
        let mut days: Vec<TradingDay> = days.into_iter().collect();
        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    /// Returns true if `day` is a trading day.
    #[must_use]
    pub fn is_valid(&self, day: TradingDay) -> bool {
        self.days.binary_search(&day).is_ok()
    }

    /// Returns the trading day immediately before `day`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotTradingDay`] if `day` is absent and
    /// [`CalendarError::NotFound`] if it is the first entry.
    pub fn previous_trading_day(&self, day: TradingDay) -> Result<TradingDay, CalendarError> {
        let idx = self
            .days
            .binary_search(&day)
            .map_err(|_| CalendarError::NotTradingDay(day))?;
        idx.checked_sub(1)
            .map(|prev| self.days[prev])
            .ok_or(CalendarError::NotFound {
                day,
                direction: "before",
            })
    }

    /// Returns the first trading day strictly after `day`.
    ///
    /// `day` itself does not need to be a trading day.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotFound`] if no later day is loaded.
    pub fn next_trading_day(&self, day: TradingDay) -> Result<TradingDay, CalendarError> {
        self.days_after(day)
            .first()
            .copied()
            .ok_or(CalendarError::NotFound {
                day,
                direction: "after",
            })
    }

    /// Returns all trading days strictly after `day`, ascending.
    #[must_use]
    pub fn days_after(&self, day: TradingDay) -> &[TradingDay] {
        let start = self.days.partition_point(|d| *d <= day);
        &self.days[start..]
    }

    /// Returns all trading days, ascending.
    #[must_use]
    pub fn days(&self) -> &[TradingDay] {
        &self.days
    }

    /// Returns the number of trading days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true if no trading day is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Returns the earliest trading day.
    #[must_use]
    pub fn first(&self) -> Option<TradingDay> {
        self.days.first().copied()
    }

    /// Returns the latest trading day.
    #[must_use]
    pub fn last(&self) -> Option<TradingDay> {
        self.days.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> TradingDay {
        s.parse().unwrap()
    }

    fn sample() -> TradingCalendar {
        TradingCalendar::from_records([
            (day("20230110"), true),
            (day("20230106"), true),
            (day("20230107"), false),
            (day("20230108"), false),
            (day("20230109"), true),
        ])
    }

    #[test]
    fn test_only_trading_days_kept_sorted() {
        let cal = sample();
        let days: Vec<String> = cal.days().iter().map(ToString::to_string).collect();
        assert_eq!(days, ["20230106", "20230109", "20230110"]);
    }

    #[test]
    fn test_is_valid() {
        let cal = sample();
        assert!(cal.is_valid(day("20230109")));
        assert!(!cal.is_valid(day("20230107")));
    }

    #[test]
    fn test_previous_trading_day_skips_weekend() {
        let cal = sample();
        let prev = cal.previous_trading_day(day("20230109")).unwrap();
        assert_eq!(prev, day("20230106"));
    }

    #[test]
    fn test_previous_of_first_is_not_found() {
        let cal = sample();
        let err = cal.previous_trading_day(day("20230106")).unwrap_err();
        assert!(matches!(err, CalendarError::NotFound { .. }));
    }

    #[test]
    fn test_previous_of_absent_day() {
        let cal = sample();
        let err = cal.previous_trading_day(day("20230107")).unwrap_err();
        assert!(matches!(err, CalendarError::NotTradingDay(_)));
        assert!(matches!(
            MinbarError::from(err),
            MinbarError::DayNotInCalendar(_)
        ));
    }

    #[test]
    fn test_days_after_is_strict() {
        let cal = sample();
        let expected = [day("20230109"), day("20230110")];
        assert_eq!(cal.days_after(day("20230106")), &expected);
        assert_eq!(cal.days_after(day("20230107")), &expected);
        assert!(cal.days_after(day("20230110")).is_empty());
    }

    #[test]
    fn test_next_trading_day() {
        let cal = sample();
        let next = cal.next_trading_day(day("20230106")).unwrap();
        assert_eq!(next, day("20230109"));
        assert!(cal.next_trading_day(day("20230110")).is_err());
    }

    #[test]
    fn test_duplicates_collapse() {
        let cal = TradingCalendar::from_days([day("20230109"), day("20230109")]);
        assert_eq!(cal.len(), 1);
        assert_eq!(cal.first(), cal.last());
    }
}
