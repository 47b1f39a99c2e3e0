//! Calendar command implementation.

use crate::config::{load_calendar, parse_day};
use anyhow::Result;
use std::path::Path;

/// Print the trading days in `path`, optionally only those after `after`.
pub(crate) fn show_calendar(path: &Path, after: Option<&str>) -> Result<()> {
    let calendar = load_calendar(path)?;
    let days = match after {
        Some(s) => calendar.days_after(parse_day(s)?),
        None => calendar.days(),
    };

    for day in days {
        println!("{day}");
    }

    match (days.first(), days.last()) {
        (Some(first), Some(last)) => {
            println!("\nTotal: {} trading days ({first} to {last})", days.len());
        }
        _ => println!("No trading days found."),
    }
    Ok(())
}
