//! Streaming, per-instrument minute-bar aggregation.

use std::collections::HashMap;

use minbar_calendar::SessionDayResolver;
use minbar_types::{MinbarError, MinuteBucket, Tick, TradingDay};
use serde::{Deserialize, Serialize};

use crate::{Bar, DirtyReason, DirtyTickFilter};

/// Number of folded ticks between progress log lines.
const PROGRESS_EVERY: u64 = 500_000;

/// What happened to a pushed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fold {
    /// Rejected by the dirty tick filter.
    Dropped(DirtyReason),
    /// Opened a new bar (closing the instrument's previous one, if any).
    Opened,
    /// Updated the instrument's current bar.
    Updated,
}

/// Counters collected during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationStats {
    /// Tick records pushed, dirty ones included.
    pub ticks_read: u64,
    /// Tick records rejected as dirty.
    pub ticks_dropped: u64,
    /// Bars opened.
    pub bars_built: u64,
}

/// Number of ticks folded into each `(instrument, minute)` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickCountIndex {
    counts: HashMap<String, HashMap<MinuteBucket, u32>>,
}

impl TickCountIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more tick in a bucket, returning the new count.
    pub fn increment(&mut self, instrument_id: &str, bucket: MinuteBucket) -> u32 {
        let per_instrument = self.counts.entry(instrument_id.to_string()).or_default();
        let count = per_instrument.entry(bucket).or_insert(0);
        *count += 1;
        *count
    }

    /// Returns the number of ticks folded into a bucket (zero if unseen).
    #[must_use]
    pub fn get(&self, instrument_id: &str, bucket: &MinuteBucket) -> u32 {
        self.counts
            .get(instrument_id)
            .and_then(|per_instrument| per_instrument.get(bucket))
            .copied()
            .unwrap_or(0)
    }

    /// Returns the number of distinct buckets recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.values().map(HashMap::len).sum()
    }

    /// Returns true if no bucket has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bars of one instrument in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentBarSeries {
    /// Instrument identifier.
    pub instrument_id: String,
    /// Bars, oldest bucket first for a well-ordered feed.
    pub bars: Vec<Bar>,
}

impl InstrumentBarSeries {
    /// Creates a series.
    #[must_use]
    pub const fn new(instrument_id: String, bars: Vec<Bar>) -> Self {
        Self {
            instrument_id,
            bars,
        }
    }

    /// Returns the number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns true if the series has no bar.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Result of the online pass over one trading day.
#[derive(Debug, Clone)]
pub struct AggregatedDay {
    /// Trading day the ticks were read for.
    pub trading_day: TradingDay,
    /// One series per instrument, ordered by instrument id.
    pub series: Vec<InstrumentBarSeries>,
    /// Tick counts per bucket.
    pub counts: TickCountIndex,
    /// Aggregation counters.
    pub stats: AggregationStats,
}

/// Aggregation state of a single instrument.
///
/// A bar moves from `current` (open, still updating) into `closed` as soon
/// as a tick for a different bucket arrives; closed bars are never touched
/// again.
#[derive(Debug, Default)]
struct InstrumentSlot {
    closed: Vec<Bar>,
    current: Option<Bar>,
    counts: HashMap<MinuteBucket, u32>,
}

impl InstrumentSlot {
    fn fold(&mut self, bucket: MinuteBucket, tick: &Tick) -> Fold {
        *self.counts.entry(bucket).or_insert(0) += 1;

        match self.current.take() {
            Some(mut bar) if bar.bucket == bucket => {
                bar.fold(tick);
                self.current = Some(bar);
                Fold::Updated
            }
            Some(bar) => {
                self.closed.push(bar);
                self.current = Some(Bar::open(bucket, tick));
                Fold::Opened
            }
            None => {
                self.current = Some(Bar::open(bucket, tick));
                Fold::Opened
            }
        }
    }

    fn into_bars(self) -> (Vec<Bar>, HashMap<MinuteBucket, u32>) {
        let mut bars = self.closed;
        bars.extend(self.current);
        (bars, self.counts)
    }
}

/// Folds a day's tick stream into minute bars, one instrument slot at a time.
///
/// Ticks are taken in arrival order. A new bar is opened whenever a tick's
/// bucket differs from the instrument's current bar; nothing is looked up
/// beyond that current bar.
#[derive(Debug)]
pub struct BarAggregator {
    resolver: SessionDayResolver,
    filter: DirtyTickFilter,
    slots: HashMap<String, InstrumentSlot>,
    stats: AggregationStats,
}

impl BarAggregator {
    /// Creates an aggregator for the resolver's trading day.
    #[must_use]
    pub fn new(resolver: SessionDayResolver) -> Self {
        Self {
            resolver,
            filter: DirtyTickFilter::new(),
            slots: HashMap::new(),
            stats: AggregationStats::default(),
        }
    }

    /// Returns the counters collected so far.
    #[must_use]
    pub const fn stats(&self) -> AggregationStats {
        self.stats
    }

    /// Returns the number of instruments seen so far.
    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.slots.len()
    }

    /// Pushes one tick.
    ///
    /// # Errors
    ///
    /// Returns [`MinbarError::Parse`] if a clean tick's update time cannot be
    /// read. This is fatal for the whole day.
    pub fn push(&mut self, mut tick: Tick) -> Result<Fold, MinbarError> {
        self.stats.ticks_read += 1;

        if let Some(reason) = self.filter.check(&tick) {
            self.stats.ticks_dropped += 1;
            return Ok(Fold::Dropped(reason));
        }

        let bucket = self.resolver.bucket(&tick.update_time)?;
        let slot = self
            .slots
            .entry(std::mem::take(&mut tick.instrument_id))
            .or_default();

        let fold = slot.fold(bucket, &tick);
        if fold == Fold::Opened {
            self.stats.bars_built += 1;
        }
        Ok(fold)
    }

    /// Closes every current bar and hands the series over for finalization.
    #[must_use]
    pub fn finish(self) -> AggregatedDay {
        let mut series = Vec::with_capacity(self.slots.len());
        let mut counts = TickCountIndex::new();

        for (instrument_id, slot) in self.slots {
            let (bars, slot_counts) = slot.into_bars();
            counts.counts.insert(instrument_id.clone(), slot_counts);
            series.push(InstrumentBarSeries::new(instrument_id, bars));
        }
        series.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));

        AggregatedDay {
            trading_day: self.resolver.trading_day(),
            series,
            counts,
            stats: self.stats,
        }
    }
}

/// Runs the dirty filter and the aggregator over a whole tick stream.
///
/// The stream is pulled one tick at a time and consumed once.
///
/// # Errors
///
/// Returns the first stream error or update-time parse error.
pub fn aggregate_day<I, E>(
    resolver: SessionDayResolver,
    ticks: I,
) -> Result<AggregatedDay, MinbarError>
where
    I: IntoIterator<Item = Result<Tick, E>>,
    MinbarError: From<E>,
{
    let mut aggregator = BarAggregator::new(resolver);

    for tick in ticks {
        let fold = aggregator.push(tick?)?;

        let stats = aggregator.stats();
        if progress_due(fold, &stats) {
            tracing::info!(
                trading_day = %resolver.trading_day(),
                ticks = stats.ticks_read,
                instruments = aggregator.instrument_count(),
                "aggregating"
            );
        }
    }

    let day = aggregator.finish();
    tracing::info!(
        trading_day = %day.trading_day,
        ticks = day.stats.ticks_read,
        dropped = day.stats.ticks_dropped,
        bars = day.stats.bars_built,
        instruments = day.series.len(),
        "aggregation finished"
    );
    Ok(day)
}

/// Dirty ticks never trigger a progress line.
fn progress_due(fold: Fold, stats: &AggregationStats) -> bool {
    let folded = stats.ticks_read - stats.ticks_dropped;
    !matches!(fold, Fold::Dropped(_)) && folded % PROGRESS_EVERY == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use minbar_calendar::TradingCalendar;
    use std::convert::Infallible;

    fn day(s: &str) -> TradingDay {
        s.parse().unwrap()
    }

    fn resolver() -> SessionDayResolver {
        let cal = TradingCalendar::from_days([day("20230109"), day("20230110")]);
        SessionDayResolver::new(day("20230110"), &cal).unwrap()
    }

    fn tick(instrument: &str, time: &str, price: f64, volume: i64) -> Tick {
        Tick::new(instrument, time)
            .with_last(price, volume)
            .with_quote(price - 1.0, price + 1.0)
    }

    #[test]
    fn test_ohlc_within_one_minute() {
        let mut agg = BarAggregator::new(resolver());
        for (i, price) in [10.0, 12.0, 9.0, 11.0].into_iter().enumerate() {
            let t = tick("cu2302", &format!("09:01:0{i}"), price, 10 + i as i64);
            agg.push(t).unwrap();
        }

        let out = agg.finish();
        let bar = out.series[0].bars[0];
        assert_eq!(out.series[0].len(), 1);
        assert_eq!(bar.open, 10.0);
        assert_eq!(bar.high, 12.0);
        assert_eq!(bar.low, 9.0);
        assert_eq!(bar.close, 11.0);
        assert_eq!(bar.volume, 13);
        assert_eq!(out.counts.get("cu2302", &bar.bucket), 4);
    }

    #[test]
    fn test_new_minute_opens_new_bar() {
        let mut agg = BarAggregator::new(resolver());
        let mut push = |time, price, vol| agg.push(tick("cu2302", time, price, vol)).unwrap();
        assert_eq!(push("09:01:00", 10.0, 1), Fold::Opened);
        assert_eq!(push("09:01:59", 11.0, 2), Fold::Updated);
        assert_eq!(push("09:02:00", 12.0, 3), Fold::Opened);

        let out = agg.finish();
        let bars = &out.series[0].bars;
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 11.0);
        assert_eq!(bars[1].open, 12.0);
        assert_eq!(out.counts.get("cu2302", &bars[0].bucket), 2);
        assert_eq!(out.counts.get("cu2302", &bars[1].bucket), 1);
        assert_eq!(out.stats.bars_built, 2);
    }

    #[test]
    fn test_instruments_are_independent() {
        let mut agg = BarAggregator::new(resolver());
        agg.push(tick("cu2302", "09:01:00", 10.0, 1)).unwrap();
        agg.push(tick("al2302", "09:01:00", 20.0, 5)).unwrap();
        // Interleaving another instrument must not close cu2302's bar.
        let fold = agg.push(tick("cu2302", "09:01:30", 9.0, 2)).unwrap();
        assert_eq!(fold, Fold::Updated);

        let out = agg.finish();
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.series[0].instrument_id, "al2302");
        assert_eq!(out.series[1].instrument_id, "cu2302");
        assert_eq!(out.series[1].bars[0].low, 9.0);
    }

    #[test]
    fn test_dirty_ticks_never_touch_bars() {
        let mut agg = BarAggregator::new(resolver());
        let mut dirty = tick("cu2302", "09:01:00", 10.0, 1);
        dirty.bid_price1 = 0.0;

        let folded = agg.push(dirty).unwrap();
        assert_eq!(folded, Fold::Dropped(DirtyReason::ZeroBid));
        assert_eq!(
            agg.push(Tick::new("cu2302", "bogus")).unwrap(),
            Fold::Dropped(DirtyReason::ZeroVolume)
        );

        let out = agg.finish();
        assert!(out.series.is_empty());
        assert!(out.counts.is_empty());
        assert_eq!(out.stats.ticks_read, 2);
        assert_eq!(out.stats.ticks_dropped, 2);
    }

    #[test]
    fn test_night_session_buckets_use_action_days() {
        let mut agg = BarAggregator::new(resolver());
        agg.push(tick("cu2302", "21:00:00", 10.0, 1)).unwrap();
        agg.push(tick("cu2302", "01:00:00", 10.0, 2)).unwrap();
        agg.push(tick("cu2302", "09:00:00", 10.0, 3)).unwrap();

        let out = agg.finish();
        let bars = &out.series[0].bars;
        let keys: Vec<String> = bars.iter().map(|b| b.bucket.to_string()).collect();
        assert_eq!(
            keys,
            ["2023010921:00:00", "2023011001:00:00", "2023011009:00:00"]
        );
    }

    #[test]
    fn test_bad_update_time_aborts() {
        let mut agg = BarAggregator::new(resolver());
        let err = agg.push(tick("cu2302", "ab:00:00", 10.0, 1)).unwrap_err();
        assert!(matches!(err, MinbarError::Parse(_)));
    }

    #[test]
    fn test_aggregate_day_propagates_stream_errors() {
        let ticks: Vec<Result<Tick, MinbarError>> = vec![
            Ok(tick("cu2302", "09:00:00", 10.0, 1)),
            Err(MinbarError::Decode("truncated element".to_string())),
        ];
        let err = aggregate_day(resolver(), ticks).unwrap_err();
        assert!(matches!(err, MinbarError::Decode(_)));
    }

    #[test]
    fn test_aggregate_day() {
        let ticks = vec![
            Ok::<_, Infallible>(tick("cu2302", "09:00:00", 10.0, 1)),
            Ok(tick("cu2302", "09:00:10", 11.0, 2)),
        ];
        let out = aggregate_day(resolver(), ticks).unwrap();
        assert_eq!(out.trading_day, day("20230110"));
        assert_eq!(out.stats.ticks_read, 2);
        assert_eq!(out.series[0].bars[0].close, 11.0);
    }

    #[test]
    fn test_progress_counts_folded_ticks() {
        let stats = AggregationStats {
            ticks_read: PROGRESS_EVERY + 1,
            ticks_dropped: 1,
            bars_built: 3,
        };
        assert!(progress_due(Fold::Updated, &stats));
        assert!(progress_due(Fold::Opened, &stats));
        assert!(!progress_due(Fold::Dropped(DirtyReason::ZeroVolume), &stats));

        let stats = AggregationStats {
            ticks_read: PROGRESS_EVERY,
            ticks_dropped: 1,
            bars_built: 3,
        };
        assert!(!progress_due(Fold::Updated, &stats));
    }
}
