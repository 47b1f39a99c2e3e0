//! Exchange trading day.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a `YYYYMMDD` date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid trading day '{0}' (expected YYYYMMDD)")]
pub struct TradingDayParseError(pub String);

/// A calendar date used as an exchange trading day.
///
/// The canonical text form is `YYYYMMDD`, which is also how the day is
/// serialized and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TradingDay(NaiveDate);

impl TradingDay {
    /// Creates a trading day from a date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Creates a trading day from year, month and day.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Returns the underlying date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the following calendar day, regardless of the exchange calendar.
    #[must_use]
    pub fn next_calendar_day(&self) -> Option<Self> {
        self.0.checked_add_days(Days::new(1)).map(Self)
    }
}

impl fmt::Display for TradingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl FromStr for TradingDay {
    type Err = TradingDayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TradingDayParseError(s.to_string()));
        }
        NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(Self)
            .map_err(|_| TradingDayParseError(s.to_string()))
    }
}

impl From<NaiveDate> for TradingDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<TradingDay> for String {
    fn from(day: TradingDay) -> Self {
        day.to_string()
    }
}

impl TryFrom<String> for TradingDay {
    type Error = TradingDayParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let day: TradingDay = "20230110".parse().unwrap();
        assert_eq!(day.date(), NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
        assert_eq!(day.to_string(), "20230110");
    }

    #[test]
    fn test_rejects_other_forms() {
        assert!("2023-01-10".parse::<TradingDay>().is_err());
        assert!("2023011".parse::<TradingDay>().is_err());
        assert!("20231310".parse::<TradingDay>().is_err());
        assert!("date".parse::<TradingDay>().is_err());
    }

    #[test]
    fn test_ordering_matches_text_order() {
        let a: TradingDay = "20221230".parse().unwrap();
        let b: TradingDay = "20230103".parse().unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_next_calendar_day_crosses_month() {
        let day: TradingDay = "20230131".parse().unwrap();
        assert_eq!(day.next_calendar_day().unwrap().to_string(), "20230201");
    }

    #[test]
    fn test_serde_uses_text_form() {
        let day: TradingDay = "20230110".parse().unwrap();
        let json = serde_json::to_string(&day).unwrap();
        assert_eq!(json, "\"20230110\"");
        let back: TradingDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, day);
    }
}
