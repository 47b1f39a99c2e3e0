//! Output writers for finalized minute bars.
//!
//! - [`CsvFormatter`] - CSV with prices at four decimals
//! - [`JsonFormatter`] - JSON array or NDJSON

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/minbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::{JsonFormatter, JsonStyle};
