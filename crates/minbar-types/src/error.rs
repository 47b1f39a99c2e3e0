//! Error types for minbar.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::TradingDay;

/// Result type alias for minbar operations.
pub type Result<T> = std::result::Result<T, MinbarError>;

/// Errors that abort the processing of a trading day.
///
/// Every variant except [`MinbarError::ArchiveNotFound`] is fatal for the
/// day being processed. None of them touches days committed earlier.
#[derive(Error, Debug)]
pub enum MinbarError {
    /// Missing or invalid configuration, detected before any I/O.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The day's archive is not present yet.
    #[error("Archive not found: {}", path.display())]
    ArchiveNotFound {
        /// Location that was probed last.
        path: PathBuf,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Gzip or tar unpacking failed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Malformed XML or tick record.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A tick's update time could not be read.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A finalized minute timestamp is not a valid date-time.
    #[error("Format error: {0}")]
    Format(String),

    /// The requested day is missing from a multi-day calendar.
    #[error("{0} is not in the trading calendar")]
    DayNotInCalendar(TradingDay),

    /// Calendar lookup or loading failed.
    #[error("Calendar error: {0}")]
    Calendar(String),

    /// Persistence failed; the day's transaction was rolled back.
    #[error("Store error: {0}")]
    Store(String),

    /// A poll exceeded its deadline.
    #[error("Gave up after {0:?}")]
    Timeout(Duration),

    /// The operation was cancelled.
    #[error("Cancelled")]
    Cancelled,
}

impl MinbarError {
    /// Returns true if the error means "not ready yet" rather than a failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ArchiveNotFound { .. })
    }
}

impl From<std::convert::Infallible> for MinbarError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}
