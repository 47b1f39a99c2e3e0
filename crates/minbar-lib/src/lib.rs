//! Futures tick archives to per-minute OHLCV bars.
//!
//! This is a facade crate that re-exports functionality from the minbar
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use minbar_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let calendar = Arc::new(load_csv("calendar.csv")?);
//!     let pipeline = DayPipeline::new(calendar, ArchiveLocator::new("/xml"));
//!     let store: Arc<dyn DayStore> = Arc::new(BarWarehouse::open(WarehouseConfig::default())?);
//!
//!     let day: TradingDay = "20230110".parse()?;
//!     let report = pipeline.process_day(day, &store, &CancelToken::never()).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/minbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use minbar_types::*;

// Re-export calendar
pub use minbar_calendar::{
    CalendarError, EARLY_MORNING_END_HOUR, NIGHT_SESSION_START_HOUR, SessionDayResolver,
    TradingCalendar, from_csv_reader, load_csv,
};

// Re-export aggregation
pub use minbar_aggregate::{
    AggregatedDay, AggregationStats, Bar, BarAggregator, DirtyReason, DirtyTickFilter,
    FinalizedBar, FinalizedDay, Finalizer, Fold, InstrumentBarSeries, MIN_TICKS_PER_BUCKET,
    TickCountIndex, aggregate_day,
};

// Re-export archive access
#[cfg(feature = "fetch")]
pub use minbar_fetch::{
    ArchiveLocator, ArchiveOrigin, CancelHandle, CancelToken, DEFAULT_POLL_INTERVAL, DecodeError,
    MountedRemote, OpenedArchive, PollPolicy, RemoteStore, TickReader, archive_name, cancel_pair,
    sleep_or_cancel, wait_until_stable, with_archive_ticks,
};

// Re-export persistence
#[cfg(feature = "store")]
pub use minbar_store::{BarWarehouse, DayStore, ReplaceReport, StoreError, WarehouseConfig};

// Re-export formatters
#[cfg(feature = "format")]
pub use minbar_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat,
};

// Re-export the day pipeline
#[cfg(feature = "daemon")]
pub use minbar_daemon::{
    CatchUpConfig, CatchUpDriver, CatchUpSummary, DEFAULT_RETRY_DELAY, DEFAULT_START_DAY,
    DayPipeline, DayReport, DriverEvent,
};

/// Prelude module for convenient imports.
///
/// ```
/// use minbar_lib::prelude::*;
/// ```
pub mod prelude {
    pub use minbar_types::{MinbarError, MinuteBucket, Result, Tick, TradingDay};

    pub use minbar_calendar::{SessionDayResolver, TradingCalendar, load_csv};

    pub use minbar_aggregate::{BarAggregator, FinalizedBar, Finalizer, aggregate_day};

    #[cfg(feature = "fetch")]
    pub use minbar_fetch::{ArchiveLocator, CancelToken, MountedRemote, PollPolicy, RemoteStore};

    #[cfg(feature = "store")]
    pub use minbar_store::{BarWarehouse, DayStore, WarehouseConfig};

    #[cfg(feature = "format")]
    pub use minbar_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "daemon")]
    pub use minbar_daemon::{CatchUpConfig, CatchUpDriver, DayPipeline, DayReport};
}
