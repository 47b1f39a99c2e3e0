//! Minute bar data structures.

use chrono::NaiveDateTime;
use minbar_types::{MinuteBucket, Tick, TradingDay};
use serde::{Deserialize, Serialize};

/// Minute bar built from last-traded prices.
///
/// `volume` holds the cumulative daily counter as last observed in the
/// bucket; the finalizer replaces it with a per-minute delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Minute the bar covers.
    pub bucket: MinuteBucket,
    /// First traded price in the minute.
    pub open: f64,
    /// Highest traded price in the minute.
    pub high: f64,
    /// Lowest traded price in the minute.
    pub low: f64,
    /// Last traded price in the minute.
    pub close: f64,
    /// Cumulative volume as of the last tick in the minute.
    pub volume: i64,
    /// Open interest as of the last tick in the minute.
    pub open_interest: f64,
}

impl Bar {
    /// Opens a bar seeded from the bucket's first tick.
    #[must_use]
    pub const fn open(bucket: MinuteBucket, tick: &Tick) -> Self {
        let last = tick.last_price;
        Self {
            bucket,
            open: last,
            high: last,
            low: last,
            close: last,
            volume: tick.volume,
            open_interest: tick.open_interest,
        }
    }

    /// Folds a later tick of the same bucket into the bar.
    ///
    /// Volume is overwritten, not summed: ticks carry a running counter.
    pub fn fold(&mut self, tick: &Tick) {
        let last = tick.last_price;
        self.high = self.high.max(last);
        self.low = self.low.min(last);
        self.close = last;
        self.open_interest = tick.open_interest;
        self.volume = tick.volume;
    }
}

/// Minute bar ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedBar {
    /// Bucket start time.
    pub timestamp: NaiveDateTime,
    /// Instrument identifier.
    pub instrument_id: String,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume traded during the minute.
    pub volume: i64,
    /// Open interest at the close of the minute.
    pub open_interest: f64,
    /// Trading day the bar was loaded under.
    pub trading_day: TradingDay,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> MinuteBucket {
        MinuteBucket::new("20230110".parse().unwrap(), 9, 1)
    }

    fn tick(price: f64, volume: i64, oi: f64) -> Tick {
        Tick::new("cu2302", "09:01:00")
            .with_last(price, volume)
            .with_open_interest(oi)
    }

    #[test]
    fn test_open_seeds_all_prices() {
        let bar = Bar::open(bucket(), &tick(10.0, 100, 5.0));
        assert_eq!(bar.open, 10.0);
        assert_eq!(bar.high, 10.0);
        assert_eq!(bar.low, 10.0);
        assert_eq!(bar.close, 10.0);
        assert_eq!(bar.volume, 100);
        assert_eq!(bar.open_interest, 5.0);
    }

    #[test]
    fn test_fold_tracks_extremes_and_overwrites_counters() {
        let mut bar = Bar::open(bucket(), &tick(10.0, 100, 5.0));
        for (price, volume) in [(12.0, 110), (9.0, 130), (11.0, 150)] {
            bar.fold(&tick(price, volume, 6.0));
        }
        assert_eq!(bar.open, 10.0);
        assert_eq!(bar.high, 12.0);
        assert_eq!(bar.low, 9.0);
        assert_eq!(bar.close, 11.0);
        assert_eq!(bar.volume, 150);
        assert_eq!(bar.open_interest, 6.0);
    }
}
