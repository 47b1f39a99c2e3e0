//! Dirty tick filtering.

use minbar_types::Tick;

/// Why a tick was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirtyReason {
    /// No volume traded yet.
    ZeroVolume,
    /// No last price.
    ZeroLastPrice,
    /// Empty ask side.
    ZeroAsk,
    /// Empty bid side.
    ZeroBid,
}

/// Rejects heartbeat and incomplete snapshot packets.
///
/// A tick is dirty if its cumulative volume, last price, best ask or best bid
/// is zero. Dirty ticks never open or update a bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirtyTickFilter;

impl DirtyTickFilter {
    /// Creates the filter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the first reason the tick is dirty, if any.
    #[must_use]
    pub fn check(&self, tick: &Tick) -> Option<DirtyReason> {
        if tick.volume == 0 {
            Some(DirtyReason::ZeroVolume)
        } else if tick.last_price == 0.0 {
            Some(DirtyReason::ZeroLastPrice)
        } else if tick.ask_price1 == 0.0 {
            Some(DirtyReason::ZeroAsk)
        } else if tick.bid_price1 == 0.0 {
            Some(DirtyReason::ZeroBid)
        } else {
            None
        }
    }

    /// Returns true if the tick may be aggregated.
    #[must_use]
    pub fn accepts(&self, tick: &Tick) -> bool {
        self.check(tick).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> Tick {
        Tick::new("rb2305", "09:00:00")
            .with_last(4_000.0, 10)
            .with_quote(3_999.0, 4_001.0)
    }

    #[test]
    fn test_clean_tick_accepted() {
        assert!(DirtyTickFilter::new().accepts(&clean()));
    }

    #[test]
    fn test_each_zero_field_rejects() {
        let filter = DirtyTickFilter::new();

        let mut tick = clean();
        tick.volume = 0;
        assert_eq!(filter.check(&tick), Some(DirtyReason::ZeroVolume));

        let mut tick = clean();
        tick.last_price = 0.0;
        assert_eq!(filter.check(&tick), Some(DirtyReason::ZeroLastPrice));

        let mut tick = clean();
        tick.ask_price1 = 0.0;
        assert_eq!(filter.check(&tick), Some(DirtyReason::ZeroAsk));

        let mut tick = clean();
        tick.bid_price1 = 0.0;
        assert_eq!(filter.check(&tick), Some(DirtyReason::ZeroBid));
    }

    #[test]
    fn test_dirty_tick_with_garbage_time_is_still_just_dirty() {
        let tick = Tick::new("rb2305", "??");
        assert!(!DirtyTickFilter::new().accepts(&tick));
    }
}
