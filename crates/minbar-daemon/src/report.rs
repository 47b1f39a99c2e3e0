//! Per-day processing report.

use std::fmt;

use minbar_aggregate::AggregationStats;
use minbar_store::ReplaceReport;
use minbar_types::TradingDay;

/// What happened to one trading day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    /// The processed day.
    pub trading_day: TradingDay,
    /// Archive location the ticks were read from.
    pub source: String,
    /// Tick records decoded from the archive.
    pub ticks_decoded: u64,
    /// Records rejected as dirty.
    pub ticks_dropped: u64,
    /// Minute bars opened during aggregation.
    pub bars_built: u64,
    /// Bars that survived finalization.
    pub bars_emitted: usize,
    /// Rows removed from a previous load. Zero for dry runs.
    pub rows_deleted: usize,
    /// Rows written. Zero for dry runs.
    pub rows_inserted: usize,
}

impl DayReport {
    pub(crate) fn new(
        trading_day: TradingDay,
        source: String,
        stats: AggregationStats,
        bars_emitted: usize,
    ) -> Self {
        Self {
            trading_day,
            source,
            ticks_decoded: stats.ticks_read,
            ticks_dropped: stats.ticks_dropped,
            bars_built: stats.bars_built,
            bars_emitted,
            rows_deleted: 0,
            rows_inserted: 0,
        }
    }

    pub(crate) fn with_replace(mut self, replace: ReplaceReport) -> Self {
        self.rows_deleted = replace.deleted;
        self.rows_inserted = replace.inserted;
        self
    }
}

impl fmt::Display for DayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ticks ({} dropped), {} bars built, {} emitted, {} rows replaced by {}",
            self.trading_day,
            self.ticks_decoded,
            self.ticks_dropped,
            self.bars_built,
            self.bars_emitted,
            self.rows_deleted,
            self.rows_inserted,
        )
    }
}
