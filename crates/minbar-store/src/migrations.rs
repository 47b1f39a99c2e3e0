//! Schema migrations.

use duckdb::Connection;

/// Fully qualified name of the minute-bar table.
pub const BAR_TABLE: &str = "future.future_min";

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_future_min",
        sql: r#"
CREATE SCHEMA IF NOT EXISTS future;

CREATE TABLE IF NOT EXISTS future.future_min (
    date_time TIMESTAMP NOT NULL,
    instrument VARCHAR NOT NULL,
    open DECIMAL(18, 4) NOT NULL,
    high DECIMAL(18, 4) NOT NULL,
    low DECIMAL(18, 4) NOT NULL,
    close DECIMAL(18, 4) NOT NULL,
    volume BIGINT NOT NULL,
    open_interest DECIMAL(18, 4) NOT NULL,
    trading_day VARCHAR NOT NULL
);
"#,
    },
    Migration {
        version: "0002_trading_day_index",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_future_min_trading_day ON future.future_min(trading_day);
"#,
    },
];

/// Brings the schema up to date. Safe to call on every open.
///
/// # Errors
///
/// Returns the DuckDB error of the first failing statement.
pub fn apply_migrations(connection: &Connection) -> Result<(), duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version VARCHAR PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let applied: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            [migration.version],
            |row| row.get(0),
        )?;
        if applied == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                [migration.version],
            )?;
            tracing::debug!(version = migration.version, "Applied migration");
        }
    }

    Ok(())
}
