//! Fetch command: mirror or list remote archives.

use crate::config::{SourceArgs, parse_day};
use anyhow::{Result, bail};

use super::cancel_on_ctrl_c;

/// Mirror `day` from the remote directory, or list what it holds.
pub(crate) async fn fetch(day: Option<&str>, list: bool, source: &SourceArgs) -> Result<()> {
    if source.remote_dir.is_none() {
        bail!("No remote archive directory configured (--remote-dir or MINBAR_REMOTE_DIR)");
    }
    let locator = source.locator()?;

    if list {
        let names = locator.list_remote().await?;
        for name in &names {
            println!("{name}");
        }
        println!("\nTotal: {} archives", names.len());
        return Ok(());
    }

    let Some(day) = day else {
        bail!("--day is required unless --list is given");
    };
    let day = parse_day(day)?;
    let path = locator.mirror(day, &cancel_on_ctrl_c()).await?;
    println!("Archive available at: {}", path.display());
    Ok(())
}
