//! Trading calendar and night-session day resolution for minbar.
//!
//! - [`TradingCalendar`] - Immutable ordered set of trading days
//! - [`SessionDayResolver`] - Maps a tick's wall-clock time to its action day
//! - [`load_csv`] - Reads `(YYYYMMDD, is-trading-day)` rows

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/minbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod calendar;
mod loader;
mod session;

pub use calendar::{CalendarError, TradingCalendar};
pub use loader::{from_csv_reader, load_csv};
pub use session::{EARLY_MORNING_END_HOUR, NIGHT_SESSION_START_HOUR, SessionDayResolver};
