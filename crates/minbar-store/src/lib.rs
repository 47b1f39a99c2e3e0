//! Transactional persistence of finalized minute bars.
//!
//! [`DayStore`] is the contract the pipeline relies on: replacing a trading
//! day is all-or-nothing. [`BarWarehouse`] implements it on DuckDB.

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/minbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod migrations;
mod warehouse;

pub use migrations::{BAR_TABLE, apply_migrations};
pub use warehouse::{BarWarehouse, DayStore, ReplaceReport, StoreError, WarehouseConfig};
