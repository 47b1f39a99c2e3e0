//! Tick data representation.

use serde::{Deserialize, Serialize};

/// A decoded depth-market-data snapshot for one instrument.
///
/// `volume` and `turnover` are running daily counters as published by the
/// exchange, not per-snapshot quantities. Ticks are consumed once by the
/// aggregator and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Exchange instrument identifier.
    pub instrument_id: String,
    /// Wall-clock update time, `HH:MM:SS`.
    pub update_time: String,
    /// Millisecond part of the update time.
    pub update_millisec: i32,
    /// Action day as published in the record, if any.
    ///
    /// The session resolver always recomputes the action day; this value is
    /// kept for diagnostics.
    pub action_day: Option<String>,
    /// Trading day as published in the record, if any.
    pub trading_day: Option<String>,
    /// Upper price limit.
    pub upper_limit_price: f64,
    /// Lower price limit.
    pub lower_limit_price: f64,
    /// Last traded price.
    pub last_price: f64,
    /// Cumulative traded volume for the day.
    pub volume: i64,
    /// Cumulative turnover for the day.
    pub turnover: f64,
    /// Open interest.
    pub open_interest: f64,
    /// Best bid price.
    pub bid_price1: f64,
    /// Size at the best bid.
    pub bid_volume1: i64,
    /// Best ask price.
    pub ask_price1: f64,
    /// Size at the best ask.
    pub ask_volume1: i64,
    /// Average traded price.
    pub average_price: f64,
}

impl Tick {
    /// Creates an empty tick for an instrument at the given update time.
    #[must_use]
    pub fn new(instrument_id: impl Into<String>, update_time: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            update_time: update_time.into(),
            ..Self::default()
        }
    }

    /// Sets the last price and cumulative volume.
    #[must_use]
    pub fn with_last(mut self, last_price: f64, volume: i64) -> Self {
        self.last_price = last_price;
        self.volume = volume;
        self
    }

    /// Sets the best bid and ask prices.
    #[must_use]
    pub fn with_quote(mut self, bid_price1: f64, ask_price1: f64) -> Self {
        self.bid_price1 = bid_price1;
        self.ask_price1 = ask_price1;
        self
    }

    /// Sets the open interest.
    #[must_use]
    pub fn with_open_interest(mut self, open_interest: f64) -> Self {
        self.open_interest = open_interest;
        self
    }
}
