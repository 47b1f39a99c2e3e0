//! Run command: one trading day.

use crate::config::{DatabaseArgs, SourceArgs, parse_day};
use crate::display::{Format, write_bars};
use anyhow::{Context, Result};
use minbar_lib::prelude::*;
use std::path::PathBuf;

use super::cancel_on_ctrl_c;

/// Process `day`, loading it into the database or exporting it.
pub(crate) async fn run(
    day: &str,
    source: &SourceArgs,
    database: &DatabaseArgs,
    export: Option<PathBuf>,
    format: Format,
) -> Result<()> {
    let day = parse_day(day)?;
    if export.is_none() {
        database.require()?;
    }
    let locator = source.locator()?;
    let calendar = source.load_calendar()?;
    let pipeline = DayPipeline::new(calendar, locator);
    let cancel = cancel_on_ctrl_c();

    match export {
        Some(output) => {
            let (report, finalized) = pipeline.dry_run(day, &cancel).await?;
            write_bars(&finalized.bars, &output, format)?;
            println!("{report}");
            println!("Output written to: {}", output.display());
        }
        None => {
            let store = database.open_store()?;
            let report = pipeline
                .process_day(day, &store, &cancel)
                .await
                .with_context(|| format!("Failed to process {day}"))?;
            println!("{report}");
        }
    }

    Ok(())
}
