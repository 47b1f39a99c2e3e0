//! Post-pass turning aggregated bars into persisted rows.

use minbar_types::{MinbarError, TradingDay};

use crate::{AggregatedDay, AggregationStats, FinalizedBar, InstrumentBarSeries, TickCountIndex};

/// Buckets with fewer ticks than this are treated as unreliable.
pub const MIN_TICKS_PER_BUCKET: u32 = 2;

/// Finalized output of one trading day.
#[derive(Debug, Clone)]
pub struct FinalizedDay {
    /// Trading day of the rows.
    pub trading_day: TradingDay,
    /// Rows ordered by instrument id, then timestamp.
    pub bars: Vec<FinalizedBar>,
    /// Counters from the aggregation pass.
    pub stats: AggregationStats,
}

/// Sorts, filters and volume-differences each instrument's bars.
///
/// For every instrument, in bucket order:
///
/// 1. buckets with fewer than `min_ticks` ticks are skipped and leave the
///    volume baseline untouched;
/// 2. the bar's volume becomes `cumulative - baseline` (baseline starts at 0)
///    and the baseline moves to the bar's cumulative volume;
/// 3. bars with a zero delta are skipped.
///
/// The emitted deltas of an instrument therefore sum to the cumulative volume
/// of its last retained bucket.
#[derive(Debug, Clone, Copy)]
pub struct Finalizer {
    min_ticks: u32,
}

impl Default for Finalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Finalizer {
    /// Creates a finalizer with [`MIN_TICKS_PER_BUCKET`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_ticks: MIN_TICKS_PER_BUCKET,
        }
    }

    /// Sets the minimum number of ticks a bucket needs to be kept.
    #[must_use]
    pub const fn with_min_ticks(mut self, min_ticks: u32) -> Self {
        self.min_ticks = min_ticks;
        self
    }

    /// Finalizes every instrument of an aggregated day.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::Format`] if a retained bucket does not form a
    /// valid timestamp.
    pub fn finalize(&self, day: AggregatedDay) -> Result<FinalizedDay, MinbarError> {
        let AggregatedDay {
            trading_day,
            series,
            counts,
            stats,
        } = day;

        let mut bars = Vec::new();
        for s in series {
            bars.extend(self.finalize_series(s, &counts, trading_day)?);
        }

        tracing::info!(
            trading_day = %trading_day,
            built = stats.bars_built,
            emitted = bars.len(),
            "finalized bars"
        );

        Ok(FinalizedDay {
            trading_day,
            bars,
            stats,
        })
    }

    /// Finalizes one instrument's series.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::Format`] if a retained bucket does not form a
    /// valid timestamp.
    pub fn finalize_series(
        &self,
        series: InstrumentBarSeries,
        counts: &TickCountIndex,
        trading_day: TradingDay,
    ) -> Result<Vec<FinalizedBar>, MinbarError> {
        let InstrumentBarSeries {
            instrument_id,
            mut bars,
        } = series;
        bars.sort_by_key(|bar| bar.bucket);

        let mut baseline = 0i64;
        let mut out = Vec::with_capacity(bars.len());

        for bar in bars {
            if counts.get(&instrument_id, &bar.bucket) < self.min_ticks {
                continue;
            }

            let delta = bar.volume - baseline;
            baseline = bar.volume;
            if delta == 0 {
                continue;
            }

            let timestamp = bar.bucket.timestamp().ok_or_else(|| {
                MinbarError::Format(format!(
                    "invalid minute '{}' for {instrument_id}",
                    bar.bucket
                ))
            })?;

            out.push(FinalizedBar {
                timestamp,
                instrument_id: instrument_id.clone(),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: delta,
                open_interest: bar.open_interest,
                trading_day,
            });
        }

        Ok(out)
    }
}
