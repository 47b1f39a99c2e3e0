//! CSV output format.

use std::io::Write;

use minbar_aggregate::FinalizedBar;

use crate::{FormatError, Formatter};

const HEADER: [&str; 9] = [
    "date_time",
    "instrument",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "open_interest",
    "trading_day",
];

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    delimiter: u8,
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a comma-separated formatter with a header row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
        }
    }

    /// Uses `delimiter` between fields.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Toggles the leading column-name row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Tab-separated output with a header row.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            include_header: true,
        }
    }
}

impl Formatter for CsvFormatter {
    fn write_bars<W: Write + Send>(
        &self,
        bars: &[FinalizedBar],
        writer: W,
    ) -> Result<(), FormatError> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        if self.include_header {
            out.write_record(HEADER)?;
        }

        for bar in bars {
            out.write_record([
                bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                bar.instrument_id.clone(),
                format!("{:.4}", bar.open),
                format!("{:.4}", bar.high),
                format!("{:.4}", bar.low),
                format!("{:.4}", bar.close),
                bar.volume.to_string(),
                format!("{:.4}", bar.open_interest),
                bar.trading_day.to_string(),
            ])?;
        }

        out.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}
