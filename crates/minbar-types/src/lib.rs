//! Core types for the minbar tick-to-minute-bar loader.
//!
//! This crate provides the fundamental data structures used throughout minbar:
//!
//! - [`TradingDay`] - Exchange trading day in `YYYYMMDD` form
//! - [`Tick`] - A decoded market-data snapshot for one instrument
//! - [`MinuteBucket`] - Aggregation key of a minute bar
//! - [`MinbarError`] - Day-level error taxonomy

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/minbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bucket;
mod error;
mod tick;
mod trading_day;

pub use bucket::MinuteBucket;
pub use error::{MinbarError, Result};
pub use tick::Tick;
pub use trading_day::{TradingDay, TradingDayParseError};
