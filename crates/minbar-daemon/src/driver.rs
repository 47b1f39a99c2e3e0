//! Multi-day catch-up.

use std::{io, sync::Arc, time::Duration};

use minbar_fetch::{CancelToken, sleep_or_cancel};
use minbar_store::DayStore;
use minbar_types::{MinbarError, TradingDay};
use tracing::{error, info, warn};

use crate::{DayPipeline, DayReport};

/// Day after which an empty store starts catching up.
pub const DEFAULT_START_DAY: &str = "20120813";

/// Delay before retrying a day whose archive is not published yet.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(600);

/// Catch-up settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchUpConfig {
    /// Process days strictly after this one. `None` resumes after the
    /// latest stored day.
    pub start: Option<TradingDay>,
    /// Wait between attempts on a missing archive.
    pub retry_delay: Duration,
}

impl Default for CatchUpConfig {
    fn default() -> Self {
        Self {
            start: None,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Progress notifications emitted by [`CatchUpDriver::run_with`].
#[derive(Debug)]
pub enum DriverEvent<'a> {
    /// Catch-up resolved its starting point.
    Resumed {
        /// Days strictly after this one are processed.
        after: TradingDay,
        /// Number of calendar days queued.
        pending: usize,
    },
    /// A day is about to be processed.
    Started(TradingDay),
    /// The day's archive is missing; the driver sleeps before retrying.
    Waiting {
        /// Day being waited on.
        trading_day: TradingDay,
        /// Sleep before the next attempt.
        retry_in: Duration,
    },
    /// A day was loaded.
    Finished(&'a DayReport),
}

/// Days loaded by a catch-up run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatchUpSummary {
    /// Reports in processing order.
    pub reports: Vec<DayReport>,
}

impl CatchUpSummary {
    /// Returns the number of days loaded.
    #[must_use]
    pub fn days_loaded(&self) -> usize {
        self.reports.len()
    }

    /// Returns the last day loaded.
    #[must_use]
    pub fn last_day(&self) -> Option<TradingDay> {
        self.reports.last().map(|r| r.trading_day)
    }
}

/// Processes every calendar day after a starting day, in order.
///
/// A missing archive is retried after [`CatchUpConfig::retry_delay`]; any
/// other error stops the run. Days loaded before the failure stay committed.
#[derive(Debug, Clone)]
pub struct CatchUpDriver {
    pipeline: DayPipeline,
    store: Arc<dyn DayStore>,
    config: CatchUpConfig,
}

impl CatchUpDriver {
    /// Creates a driver with the default configuration.
    pub fn new(pipeline: DayPipeline, store: Arc<dyn DayStore>) -> Self {
        Self {
            pipeline,
            store,
            config: CatchUpConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CatchUpConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the day after which processing starts: the configured start,
    /// else the latest stored day, else [`DEFAULT_START_DAY`].
    ///
    /// # Errors
    ///
    /// Returns store errors.
    pub async fn resolve_start(&self) -> Result<TradingDay, MinbarError> {
        if let Some(start) = self.config.start {
            return Ok(start);
        }

        let store = Arc::clone(&self.store);
        let latest = tokio::task::spawn_blocking(move || store.latest_trading_day())
            .await
            .map_err(|e| MinbarError::Io(io::Error::other(e)))??;

        match latest {
            Some(day) => Ok(day),
            None => DEFAULT_START_DAY
                .parse()
                .map_err(|e| MinbarError::Config(format!("default start day: {e}"))),
        }
    }

    /// Runs catch-up to the end of the calendar.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable day error, or
    /// [`MinbarError::Cancelled`].
    pub async fn run(&self, cancel: &CancelToken) -> Result<CatchUpSummary, MinbarError> {
        self.run_with(cancel, |_| {}).await
    }

    /// Like [`CatchUpDriver::run`], reporting progress to `on_event`.
    ///
    /// # Errors
    ///
    /// Same as [`CatchUpDriver::run`].
    pub async fn run_with<F>(
        &self,
        cancel: &CancelToken,
        mut on_event: F,
    ) -> Result<CatchUpSummary, MinbarError>
    where
        F: FnMut(DriverEvent<'_>),
    {
        let after = self.resolve_start().await?;
        let days = self.pipeline.calendar().days_after(after).to_vec();
        info!(%after, pending = days.len(), "Starting catch-up");
        on_event(DriverEvent::Resumed {
            after,
            pending: days.len(),
        });

        let mut summary = CatchUpSummary::default();
        for day in days {
            on_event(DriverEvent::Started(day));
            loop {
                if cancel.is_cancelled() {
                    return Err(MinbarError::Cancelled);
                }
                match self.pipeline.process_day(day, &self.store, cancel).await {
                    Ok(report) => {
                        on_event(DriverEvent::Finished(&report));
                        summary.reports.push(report);
                        break;
                    }
                    Err(e) if e.is_retryable() => {
                        let retry_in = self.config.retry_delay;
                        warn!(
                            trading_day = %day,
                            error = %e,
                            ?retry_in,
                            "Archive not available yet"
                        );
                        on_event(DriverEvent::Waiting {
                            trading_day: day,
                            retry_in,
                        });
                        sleep_or_cancel(retry_in, cancel).await?;
                    }
                    Err(e) => {
                        error!(trading_day = %day, error = %e, "Stopping catch-up");
                        return Err(e);
                    }
                }
            }
        }

        info!(days = summary.days_loaded(), "Catch-up finished");
        Ok(summary)
    }
}
