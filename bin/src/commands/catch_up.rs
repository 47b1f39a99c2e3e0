//! Catch-up command: every trading day after a starting day.

use crate::config::{DatabaseArgs, SourceArgs, parse_day};
use crate::display::spinner;
use anyhow::Result;
use minbar_lib::DriverEvent;
use minbar_lib::prelude::*;
use std::time::Duration;

use super::cancel_on_ctrl_c;

/// Walk the calendar, loading each day after `start`.
pub(crate) async fn catch_up(
    start: Option<&str>,
    retry_secs: u64,
    source: &SourceArgs,
    database: &DatabaseArgs,
    quiet: bool,
) -> Result<()> {
    let start = start.map(parse_day).transpose()?;
    database.require()?;
    let locator = source.locator()?;
    let calendar = source.load_calendar()?;
    let store = database.open_store()?;

    let config = CatchUpConfig {
        start,
        retry_delay: Duration::from_secs(retry_secs),
    };
    let driver = CatchUpDriver::new(DayPipeline::new(calendar, locator), store).with_config(config);
    let cancel = cancel_on_ctrl_c();

    let progress = spinner(quiet)?;
    let mut done = 0usize;
    let mut pending = 0usize;
    let result = driver
        .run_with(&cancel, |event| match event {
            DriverEvent::Resumed {
                after,
                pending: queued,
            } => {
                pending = queued;
                progress.set_message(format!("{queued} trading days after {after}"));
            }
            DriverEvent::Started(day) => {
                progress.set_message(format!("[{}/{pending}] {day}", done + 1));
            }
            DriverEvent::Waiting {
                trading_day,
                retry_in,
            } => {
                progress.set_message(format!(
                    "[{}/{pending}] {trading_day}: waiting {}s for archive",
                    done + 1,
                    retry_in.as_secs()
                ));
            }
            DriverEvent::Finished(report) => {
                done += 1;
                progress.println(report.to_string());
            }
        })
        .await;

    match result {
        Ok(summary) => {
            progress.finish_with_message(format!("Loaded {} trading days", summary.days_loaded()));
            Ok(())
        }
        Err(e) => {
            progress.abandon_with_message(format!("Stopped after {done} trading days"));
            Err(e.into())
        }
    }
}
