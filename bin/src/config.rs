//! Command-line configuration with environment fallbacks.
//!
//! Everything here is validated before any archive or database I/O.

use anyhow::{Context, Result};
use clap::Args;
use minbar_lib::DEFAULT_POLL_INTERVAL;
use minbar_lib::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Where archives and the trading calendar come from.
#[derive(Args, Debug, Clone)]
pub(crate) struct SourceArgs {
    /// Trading calendar CSV (`YYYYMMDD,true|false` per line)
    #[arg(long, env = "MINBAR_CALENDAR", default_value = "calendar.csv")]
    pub(crate) calendar: PathBuf,

    /// Local archive directory holding <YYYYMMDD>.tar.gz files
    #[arg(long, env = "MINBAR_ARCHIVE_DIR", default_value = "/xml")]
    pub(crate) archive_dir: PathBuf,

    /// Remote archive directory used when the local archive is missing
    #[arg(long, env = "MINBAR_REMOTE_DIR")]
    pub(crate) remote_dir: Option<PathBuf>,

    /// Seconds between remote file size checks
    #[arg(
        long,
        env = "MINBAR_POLL_SECS",
        default_value_t = DEFAULT_POLL_INTERVAL.as_secs()
    )]
    pub(crate) poll_secs: u64,

    /// Give up waiting on a remote upload after this many seconds
    #[arg(long, env = "MINBAR_DEADLINE_SECS")]
    pub(crate) deadline_secs: Option<u64>,
}

impl SourceArgs {
    pub(crate) fn poll_policy(&self) -> Result<PollPolicy, MinbarError> {
        if self.poll_secs == 0 {
            return Err(MinbarError::Config(
                "poll interval must be at least one second".to_string(),
            ));
        }
        Ok(PollPolicy::default()
            .with_interval(Duration::from_secs(self.poll_secs))
            .with_deadline(self.deadline_secs.map(Duration::from_secs)))
    }

    /// Builds the archive locator, rejecting a remote directory that does
    /// not exist.
    pub(crate) fn locator(&self) -> Result<ArchiveLocator, MinbarError> {
        let locator = ArchiveLocator::new(&self.archive_dir).with_poll_policy(self.poll_policy()?);
        match &self.remote_dir {
            Some(dir) if !dir.is_dir() => Err(MinbarError::Config(format!(
                "remote archive directory {} does not exist",
                dir.display()
            ))),
            Some(dir) => Ok(locator.with_remote(Arc::new(MountedRemote::new(dir)))),
            None => Ok(locator),
        }
    }

    pub(crate) fn load_calendar(&self) -> Result<Arc<TradingCalendar>> {
        load_calendar(&self.calendar)
    }
}

pub(crate) fn load_calendar(path: &Path) -> Result<Arc<TradingCalendar>> {
    let calendar =
        load_csv(path).with_context(|| format!("Failed to load calendar {}", path.display()))?;
    Ok(Arc::new(calendar))
}

/// Target database.
#[derive(Args, Debug, Clone)]
pub(crate) struct DatabaseArgs {
    /// DuckDB database file receiving the bars
    #[arg(long, env = "MINBAR_DATABASE")]
    pub(crate) database: Option<PathBuf>,
}

impl DatabaseArgs {
    pub(crate) fn require(&self) -> Result<&Path, MinbarError> {
        self.database.as_deref().ok_or_else(|| {
            MinbarError::Config(
                "no database configured (--database or MINBAR_DATABASE)".to_string(),
            )
        })
    }

    pub(crate) fn open_store(&self) -> Result<Arc<dyn DayStore>> {
        let path = self.require()?;
        let warehouse = BarWarehouse::open(WarehouseConfig {
            db_path: path.to_path_buf(),
        })
        .with_context(|| format!("Failed to open database {}", path.display()))?;
        Ok(Arc::new(warehouse))
    }
}

pub(crate) fn parse_day(s: &str) -> Result<TradingDay> {
    Ok(s.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(remote_dir: Option<PathBuf>) -> SourceArgs {
        SourceArgs {
            calendar: PathBuf::from("calendar.csv"),
            archive_dir: PathBuf::from("/xml"),
            remote_dir,
            poll_secs: 10,
            deadline_secs: Some(60),
        }
    }

    #[test]
    fn test_locator_without_remote() {
        let locator = source(None).locator().unwrap();
        assert_eq!(locator.local_dir(), Path::new("/xml"));
        assert!(locator.remote().is_none());
    }

    #[test]
    fn test_missing_remote_dir_is_config_error() {
        let err = source(Some(PathBuf::from("/definitely/not/here")))
            .locator()
            .unwrap_err();
        assert!(matches!(err, MinbarError::Config(_)));
    }

    #[test]
    fn test_existing_remote_dir() {
        let dir = tempfile::tempdir().unwrap();
        let locator = source(Some(dir.path().to_path_buf())).locator().unwrap();
        assert!(locator.remote().is_some());
    }

    #[test]
    fn test_poll_policy() {
        let policy = source(None).poll_policy().unwrap();
        assert_eq!(policy.interval, Duration::from_secs(10));
        assert_eq!(policy.deadline, Some(Duration::from_secs(60)));

        let mut zero = source(None);
        zero.poll_secs = 0;
        assert!(zero.poll_policy().is_err());
    }

    #[test]
    fn test_database_required() {
        let err = DatabaseArgs { database: None }.require().unwrap_err();
        assert!(matches!(err, MinbarError::Config(_)));
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(parse_day("20230110").unwrap().to_string(), "20230110");
        assert!(parse_day("2023-01-10").is_err());
    }
}
