//! Night-session action-day resolution.

use minbar_types::{MinbarError, MinuteBucket, TradingDay};

use crate::TradingCalendar;

/// Ticks stamped at or after this hour belong to the previous trading day's
/// night session.
pub const NIGHT_SESSION_START_HOUR: u8 = 20;

/// Ticks stamped before this hour continue the previous night session past
/// midnight.
pub const EARLY_MORNING_END_HOUR: u8 = 4;

/// Resolves the calendar day each tick of a trading day belongs to.
///
/// A trading day's stream starts with the night session opened on the
/// previous trading day (`action_day`), continues past midnight
/// (`action_next_day`, one calendar day later) and ends with the day session
/// on the trading day itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDayResolver {
    trading_day: TradingDay,
    action_day: TradingDay,
    action_next_day: TradingDay,
}

impl SessionDayResolver {
    /// Builds the resolver for `trading_day`.
    ///
    /// A calendar holding a single trading day collapses both night-session
    /// days onto `trading_day`.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::DayNotInCalendar`] if `trading_day` is not in a
    /// multi-day calendar and [`MinbarError::Calendar`] if it has no
    /// predecessor.
    pub fn new(trading_day: TradingDay, calendar: &TradingCalendar) -> Result<Self, MinbarError> {
        if calendar.len() == 1 {
            return Ok(Self::collapsed(trading_day));
        }

        let action_day = calendar.previous_trading_day(trading_day)?;
        let action_next_day = action_day.next_calendar_day().ok_or_else(|| {
            MinbarError::Calendar(format!("no calendar day follows {action_day}"))
        })?;

        Ok(Self {
            trading_day,
            action_day,
            action_next_day,
        })
    }

    /// Builds a resolver that attributes every tick to `trading_day`.
    #[must_use]
    pub const fn collapsed(trading_day: TradingDay) -> Self {
        Self {
            trading_day,
            action_day: trading_day,
            action_next_day: trading_day,
        }
    }

    /// Returns the trading day being processed.
    #[must_use]
    pub const fn trading_day(&self) -> TradingDay {
        self.trading_day
    }

    /// Returns the day the night session opened on.
    #[must_use]
    pub const fn action_day(&self) -> TradingDay {
        self.action_day
    }

    /// Returns the calendar day after [`Self::action_day`].
    #[must_use]
    pub const fn action_next_day(&self) -> TradingDay {
        self.action_next_day
    }

    /// Returns the action day for a tick stamped at `hour`.
    #[must_use]
    pub const fn action_day_for_hour(&self, hour: u8) -> TradingDay {
        if hour >= NIGHT_SESSION_START_HOUR {
            self.action_day
        } else if hour < EARLY_MORNING_END_HOUR {
            self.action_next_day
        } else {
            self.trading_day
        }
    }

    /// Returns the action day for an `HH:MM:SS[.mmm]` update time.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::Parse`] if the hour cannot be read.
    pub fn resolve(&self, update_time: &str) -> Result<TradingDay, MinbarError> {
        Ok(self.action_day_for_hour(parse_hour(update_time)?))
    }

    /// Returns the minute bucket for an `HH:MM:SS[.mmm]` update time.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::Parse`] if the hour or minute cannot be read.
    pub fn bucket(&self, update_time: &str) -> Result<MinuteBucket, MinbarError> {
        let hour = parse_hour(update_time)?;
        let minute =
            parse_two_digits(update_time, 3).ok_or_else(|| invalid("minute", update_time))?;
        let day = self.action_day_for_hour(hour);
        Ok(MinuteBucket::new(day, hour, minute))
    }
}

fn parse_hour(update_time: &str) -> Result<u8, MinbarError> {
    parse_two_digits(update_time, 0).ok_or_else(|| invalid("hour", update_time))
}

fn invalid(field: &str, update_time: &str) -> MinbarError {
    MinbarError::Parse(format!("invalid {field} in '{update_time}'"))
}

fn parse_two_digits(s: &str, at: usize) -> Option<u8> {
    match s.as_bytes().get(at..at + 2)? {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => Some((a - b'0') * 10 + (b - b'0')),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> TradingDay {
        s.parse().unwrap()
    }

    fn resolver() -> SessionDayResolver {
        let cal = TradingCalendar::from_days([day("20230106"), day("20230109"), day("20230110")]);
        SessionDayResolver::new(day("20230110"), &cal).unwrap()
    }

    #[test]
    fn test_night_session_belongs_to_previous_day() {
        assert_eq!(resolver().resolve("20:05:30").unwrap(), day("20230109"));
        assert_eq!(resolver().resolve("23:59:59.500").unwrap(), day("20230109"));
    }

    #[test]
    fn test_after_midnight_is_previous_day_plus_one() {
        assert_eq!(resolver().resolve("03:30:00").unwrap(), day("20230110"));
        assert_eq!(resolver().resolve("00:00:00").unwrap(), day("20230110"));
    }

    #[test]
    fn test_day_session_is_trading_day() {
        assert_eq!(resolver().resolve("04:00:00").unwrap(), day("20230110"));
        assert_eq!(resolver().resolve("14:59:59").unwrap(), day("20230110"));
        assert_eq!(resolver().resolve("19:59:59").unwrap(), day("20230110"));
    }

    #[test]
    fn test_monday_night_session_maps_to_friday_and_saturday() {
        let cal = TradingCalendar::from_days([day("20230106"), day("20230109")]);
        let r = SessionDayResolver::new(day("20230109"), &cal).unwrap();
        assert_eq!(r.action_day(), day("20230106"));
        assert_eq!(r.action_next_day(), day("20230107"));
        assert_eq!(r.resolve("21:00:00").unwrap(), day("20230106"));
        assert_eq!(r.resolve("01:00:00").unwrap(), day("20230107"));
    }

    #[test]
    fn test_single_day_calendar_collapses() {
        let cal = TradingCalendar::from_days([day("20230110")]);
        let r = SessionDayResolver::new(day("20230110"), &cal).unwrap();
        assert_eq!(r.resolve("21:00:00").unwrap(), day("20230110"));
        assert_eq!(r.resolve("01:00:00").unwrap(), day("20230110"));
    }

    #[test]
    fn test_day_missing_from_calendar() {
        let cal = TradingCalendar::from_days([day("20230106"), day("20230109")]);
        let err = SessionDayResolver::new(day("20230110"), &cal).unwrap_err();
        assert!(matches!(err, MinbarError::DayNotInCalendar(_)));
    }

    #[test]
    fn test_first_calendar_day_has_no_predecessor() {
        let cal = TradingCalendar::from_days([day("20230106"), day("20230109")]);
        let err = SessionDayResolver::new(day("20230106"), &cal).unwrap_err();
        assert!(matches!(err, MinbarError::Calendar(_)));
    }

    #[test]
    fn test_unparseable_hour() {
        let r = resolver();
        assert!(matches!(r.resolve("x9:00:00"), Err(MinbarError::Parse(_))));
        assert!(matches!(r.resolve("9"), Err(MinbarError::Parse(_))));
        assert!(matches!(r.resolve(""), Err(MinbarError::Parse(_))));
    }

    #[test]
    fn test_bucket_truncates_to_minute() {
        let r = resolver();
        let bucket = r.bucket("21:05:59").unwrap();
        assert_eq!(bucket.to_string(), "2023010921:05:00");
        assert!(matches!(r.bucket("21:xx:00"), Err(MinbarError::Parse(_))));
    }
}
