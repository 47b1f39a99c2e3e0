//! Minute bucket keys.

use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::TradingDay;

/// The minute a tick is attributed to: its action day plus `HH:MM`.
///
/// Ordering is chronological (day, then hour, then minute). Hour and minute
/// are kept as read from the feed and are only validated when the bucket is
/// turned into a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MinuteBucket {
    /// Action day of the tick.
    pub day: TradingDay,
    /// Hour of the update time.
    pub hour: u8,
    /// Minute of the update time.
    pub minute: u8,
}

impl MinuteBucket {
    /// Creates a new bucket key.
    #[must_use]
    pub const fn new(day: TradingDay, hour: u8, minute: u8) -> Self {
        Self { day, hour, minute }
    }

    /// Returns the bucket start as a timestamp (seconds fixed at zero).
    ///
    /// Returns `None` if the hour or minute is out of range.
    #[must_use]
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .map(|time| self.day.date().and_time(time))
    }
}

impl fmt::Display for MinuteBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}:{:02}:00", self.day, self.hour, self.minute)
    }
}
