//! One trading day, end to end.

use std::{io, sync::Arc};

use minbar_aggregate::{FinalizedDay, Finalizer, aggregate_day};
use minbar_calendar::{SessionDayResolver, TradingCalendar};
use minbar_fetch::{ArchiveLocator, CancelToken, with_archive_ticks};
use minbar_store::DayStore;
use minbar_types::{MinbarError, TradingDay};
use tracing::info;

use crate::DayReport;

/// Runs the decode, aggregate, finalize and load stages for single days.
#[derive(Debug, Clone)]
pub struct DayPipeline {
    calendar: Arc<TradingCalendar>,
    locator: ArchiveLocator,
    finalizer: Finalizer,
}

impl DayPipeline {
    /// Creates a pipeline with the default finalizer.
    pub fn new(calendar: Arc<TradingCalendar>, locator: ArchiveLocator) -> Self {
        Self {
            calendar,
            locator,
            finalizer: Finalizer::default(),
        }
    }

    /// Replaces the finalizer.
    #[must_use]
    pub fn with_finalizer(mut self, finalizer: Finalizer) -> Self {
        self.finalizer = finalizer;
        self
    }

    /// Returns the trading calendar.
    #[must_use]
    pub fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    /// Returns the archive locator.
    #[must_use]
    pub const fn locator(&self) -> &ArchiveLocator {
        &self.locator
    }

    /// Builds the finalized bars of `day` without touching any store.
    ///
    /// The session days are resolved before the archive is looked up, so a
    /// day missing from the calendar fails without I/O.
    ///
    /// # Errors
    ///
    /// Returns the first calendar, archive, decode, parse or format error.
    pub async fn build_day(
        &self,
        day: TradingDay,
        cancel: &CancelToken,
    ) -> Result<(FinalizedDay, String), MinbarError> {
        let resolver = SessionDayResolver::new(day, &self.calendar)?;
        info!(
            trading_day = %day,
            action_day = %resolver.action_day(),
            action_next_day = %resolver.action_next_day(),
            "Processing trading day"
        );

        let opened = self.locator.open(day, cancel).await?;
        let source = opened.origin.to_string();
        info!(trading_day = %day, %source, "Reading archive");

        let reader = opened.reader;
        let finalizer = self.finalizer;
        let finalized = tokio::task::spawn_blocking(move || {
            let aggregated = with_archive_ticks(reader, |ticks| aggregate_day(resolver, ticks))?;
            finalizer.finalize(aggregated)
        })
        .await
        .map_err(join_error)??;

        Ok((finalized, source))
    }

    /// Processes `day` and atomically replaces its rows in `store`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`DayPipeline::build_day`] and store failures.
    /// The store is left untouched on any error.
    pub async fn process_day(
        &self,
        day: TradingDay,
        store: &Arc<dyn DayStore>,
        cancel: &CancelToken,
    ) -> Result<DayReport, MinbarError> {
        let (finalized, source) = self.build_day(day, cancel).await?;
        let FinalizedDay { bars, stats, .. } = finalized;
        let report = DayReport::new(day, source, stats, bars.len());

        let store = Arc::clone(store);
        let replace = tokio::task::spawn_blocking(move || store.replace_day(day, &bars))
            .await
            .map_err(join_error)??;

        let report = report.with_replace(replace);
        info!(
            trading_day = %day,
            ticks = report.ticks_decoded,
            dropped = report.ticks_dropped,
            bars = report.bars_emitted,
            deleted = report.rows_deleted,
            inserted = report.rows_inserted,
            "Trading day loaded"
        );
        Ok(report)
    }

    /// Builds `day` and returns its report together with the bars, leaving
    /// every store untouched.
    ///
    /// # Errors
    ///
    /// Same as [`DayPipeline::build_day`].
    pub async fn dry_run(
        &self,
        day: TradingDay,
        cancel: &CancelToken,
    ) -> Result<(DayReport, FinalizedDay), MinbarError> {
        let (finalized, source) = self.build_day(day, cancel).await?;
        let report = DayReport::new(day, source, finalized.stats, finalized.bars.len());
        info!(
            trading_day = %day,
            bars = report.bars_emitted,
            "Dry run finished"
        );
        Ok((report, finalized))
    }
}

fn join_error(err: tokio::task::JoinError) -> MinbarError {
    MinbarError::Io(io::Error::other(err))
}
