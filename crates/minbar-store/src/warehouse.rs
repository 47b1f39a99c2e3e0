//! DuckDB-backed day store.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDateTime;
use duckdb::{Connection, params};
use minbar_aggregate::FinalizedBar;
use minbar_types::{MinbarError, TradingDay};
use thiserror::Error;
use tracing::info;

use crate::migrations::{BAR_TABLE, apply_migrations};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// DuckDB rejected a statement.
    #[error(transparent)]
    DuckDb(#[from] duckdb::Error),

    /// Creating the database directory failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A stored row could not be read back.
    #[error("invalid stored row: {0}")]
    InvalidRow(String),

    /// A previous holder of the connection panicked.
    #[error("connection lock poisoned")]
    Poisoned,
}

impl From<StoreError> for MinbarError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

/// Outcome of a [`DayStore::replace_day`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceReport {
    /// The day that was replaced.
    pub trading_day: TradingDay,
    /// Rows removed from the previous load of the day.
    pub deleted: usize,
    /// Rows written.
    pub inserted: usize,
}

/// Persistence contract for finalized bars.
pub trait DayStore: Send + Sync + fmt::Debug {
    /// Deletes every stored row of `day` and inserts `bars`, atomically.
    ///
    /// On error nothing is changed.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error; the transaction is rolled back.
    fn replace_day(
        &self,
        day: TradingDay,
        bars: &[FinalizedBar],
    ) -> Result<ReplaceReport, StoreError>;

    /// Returns the greatest trading day with stored rows.
    ///
    /// # Errors
    ///
    /// Returns the underlying store error.
    fn latest_trading_day(&self) -> Result<Option<TradingDay>, StoreError>;
}

/// Where the warehouse keeps its database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// DuckDB database file.
    pub db_path: PathBuf,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("minbar.duckdb"),
        }
    }
}

/// Minute-bar store on a single DuckDB connection.
pub struct BarWarehouse {
    db_path: Option<PathBuf>,
    connection: Mutex<Connection>,
}

impl fmt::Debug for BarWarehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarWarehouse")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl BarWarehouse {
    /// Opens (creating if needed) the database at `config.db_path` and
    /// migrates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the database
    /// cannot be opened or a migration fails.
    pub fn open(config: WarehouseConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let connection = Connection::open(&config.db_path)?;
        apply_migrations(&connection)?;
        info!(path = %config.db_path.display(), "Opened warehouse");
        Ok(Self {
            db_path: Some(config.db_path),
            connection: Mutex::new(connection),
        })
    }

    /// Opens a migrated in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if DuckDB cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory()?;
        apply_migrations(&connection)?;
        Ok(Self {
            db_path: None,
            connection: Mutex::new(connection),
        })
    }

    /// Returns the database file, or `None` for in-memory databases.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Reads back the stored bars of `day`, ordered by instrument then time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is malformed.
    pub fn day_bars(&self, day: TradingDay) -> Result<Vec<FinalizedBar>, StoreError> {
        let connection = self.lock()?;
        let mut statement = connection.prepare(&format!(
            "SELECT strftime(date_time, '{TIMESTAMP_FORMAT}'), instrument, \
                    CAST(open AS DOUBLE), CAST(high AS DOUBLE), CAST(low AS DOUBLE), \
                    CAST(close AS DOUBLE), volume, CAST(open_interest AS DOUBLE) \
             FROM {BAR_TABLE} WHERE trading_day = ? ORDER BY instrument, date_time"
        ))?;
        let rows = statement.query_map([day.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                [
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, f64>(5)?,
                ],
                row.get::<_, i64>(6)?,
                row.get::<_, f64>(7)?,
            ))
        })?;

        let mut bars = Vec::new();
        for row in rows {
            let (ts, id, [open, high, low, close], volume, oi) = row?;
            let timestamp = NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT)
                .map_err(|e| invalid_row(&ts, e))?;
            bars.push(FinalizedBar {
                timestamp,
                instrument_id: id,
                open,
                high,
                low,
                close,
                volume,
                open_interest: oi,
                trading_day: day,
            });
        }
        Ok(bars)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl DayStore for BarWarehouse {
    fn replace_day(
        &self,
        day: TradingDay,
        bars: &[FinalizedBar],
    ) -> Result<ReplaceReport, StoreError> {
        let connection = self.lock()?;
        let key = day.to_string();

        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<ReplaceReport, StoreError> {
            let delete = format!("DELETE FROM {BAR_TABLE} WHERE trading_day = ?");
            let deleted = connection.execute(&delete, [&key])?;

            let mut insert = connection.prepare(&format!(
                "INSERT INTO {BAR_TABLE} \
                 (date_time, instrument, open, high, low, close, volume, open_interest, \
                  trading_day) \
                 VALUES (CAST(? AS TIMESTAMP), ?, ?, ?, ?, ?, ?, ?, ?)"
            ))?;
            for bar in bars {
                insert.execute(params![
                    bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    bar.instrument_id,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume,
                    bar.open_interest,
                    key,
                ])?;
            }

            Ok(ReplaceReport {
                trading_day: day,
                deleted,
                inserted: bars.len(),
            })
        })();

        let report = finalize_transaction(&connection, result)?;
        info!(
            %day,
            deleted = report.deleted,
            inserted = report.inserted,
            "Replaced trading day"
        );
        Ok(report)
    }

    fn latest_trading_day(&self) -> Result<Option<TradingDay>, StoreError> {
        let connection = self.lock()?;
        let query = format!("SELECT MAX(trading_day) FROM {BAR_TABLE}");
        let latest: Option<String> = connection.query_row(&query, [], |row| row.get(0))?;
        let Some(latest) = latest else {
            return Ok(None);
        };
        let day = latest.parse().map_err(|e| invalid_row(&latest, e))?;
        Ok(Some(day))
    }
}

fn invalid_row(value: &str, err: impl fmt::Display) -> StoreError {
    StoreError::InvalidRow(format!("{value:?}: {err}"))
}

fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}
