//! Bar writers and the format selector.

use std::{fmt, io, str::FromStr};

use minbar_aggregate::FinalizedBar;
use thiserror::Error;

use crate::{CsvFormatter, JsonFormatter};

/// Export targets for finalized bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Comma-separated rows with a header.
    #[default]
    Csv,
    /// One JSON array holding every bar.
    Json,
    /// One JSON object per line.
    Ndjson,
}

impl OutputFormat {
    const ALL: [Self; 3] = [Self::Csv, Self::Json, Self::Ndjson];

    /// File extension conventionally used for exports.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }

    /// Every supported format, CSV first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// Writes `bars` using the formatter this variant stands for, with its
    /// default settings.
    ///
    /// # Errors
    ///
    /// Fails if serialization or the underlying writer fails.
    pub fn write_bars<W: io::Write + Send>(
        self,
        bars: &[FinalizedBar],
        writer: W,
    ) -> Result<(), FormatError> {
        match self {
            Self::Csv => CsvFormatter::new().write_bars(bars, writer),
            Self::Json => JsonFormatter::new().write_bars(bars, writer),
            Self::Ndjson => JsonFormatter::ndjson().write_bars(bars, writer),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            _ => Err(FormatError::UnknownFormat(s.to_owned())),
        }
    }
}

/// Export failures.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The requested format name is not supported.
    #[error("unsupported output format `{0}` (expected csv, json or ndjson)")]
    UnknownFormat(String),

    /// Writing to the destination failed.
    #[error("failed to write bars: {0}")]
    Io(#[from] io::Error),

    /// The CSV writer rejected a record.
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    /// A bar could not be serialized as JSON.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes finalized bars to a byte sink.
///
/// Implementations write rows in the order given. The day pipeline already
/// sorts them by instrument, then minute.
pub trait Formatter: Send + Sync {
    /// Writes every bar in `bars` and flushes `writer`.
    ///
    /// # Errors
    ///
    /// Fails if serialization or the underlying writer fails.
    fn write_bars<W: io::Write + Send>(
        &self,
        bars: &[FinalizedBar],
        writer: W,
    ) -> Result<(), FormatError>;

    /// Extension of the files this formatter produces.
    fn extension(&self) -> &str;
}
