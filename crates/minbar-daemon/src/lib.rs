//! Day pipeline and catch-up driver for minbar.
//!
//! [`DayPipeline`] runs one trading day end to end: resolve the session
//! days, locate and unpack the archive, aggregate, finalize and replace the
//! day in a [`DayStore`]. [`CatchUpDriver`] walks the calendar with it,
//! waiting on archives that have not been published yet.
//!
//! [`DayStore`]: minbar_store::DayStore

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/minbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod driver;
#[cfg(test)]
mod fixtures;
mod pipeline;
mod report;

pub use driver::{
    CatchUpConfig, CatchUpDriver, CatchUpSummary, DEFAULT_RETRY_DELAY, DEFAULT_START_DAY,
    DriverEvent,
};
pub use pipeline::DayPipeline;
pub use report::DayReport;
