//! Tick-to-minute-bar aggregation for minbar.
//!
//! One trading day flows through three stages:
//!
//! - [`DirtyTickFilter`] - Rejects heartbeat and incomplete snapshots
//! - [`BarAggregator`] - Folds ticks into one [`Bar`] per instrument and minute
//! - [`Finalizer`] - Drops unreliable buckets and turns cumulative volume
//!   into per-minute deltas, producing [`FinalizedBar`]s
//!
//! [`aggregate_day`] runs the first two stages over a tick stream.

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/minbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod bar;
mod filter;
mod finalize;

pub use aggregator::{
    AggregatedDay, AggregationStats, BarAggregator, Fold, InstrumentBarSeries, TickCountIndex,
    aggregate_day,
};
pub use bar::{Bar, FinalizedBar};
pub use filter::{DirtyReason, DirtyTickFilter};
pub use finalize::{FinalizedDay, Finalizer, MIN_TICKS_PER_BUCKET};
