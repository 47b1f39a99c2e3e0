//! Calendar file loading.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use minbar_types::TradingDay;

use crate::{CalendarError, TradingCalendar};

/// Loads a calendar from a headerless `date,is_trading_day` CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a trading-day row carries
/// an invalid date.
pub fn load_csv(path: impl AsRef<Path>) -> Result<TradingCalendar, CalendarError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| CalendarError::Read {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let calendar = from_csv_reader(file)?;
    tracing::info!(
        path = %path.display(),
        days = calendar.len(),
        first = ?calendar.first().map(|d| d.to_string()),
        last = ?calendar.last().map(|d| d.to_string()),
        "loaded trading calendar"
    );
    Ok(calendar)
}

/// Reads a calendar from CSV rows of `(YYYYMMDD, true|false)`.
///
/// Rows whose flag is not `true` (including a header row) are ignored.
///
/// # Errors
///
/// Returns an error on malformed CSV or an invalid date on a `true` row.
pub fn from_csv_reader<R: Read>(reader: R) -> Result<TradingCalendar, CalendarError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut days = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let (Some(date), Some(flag)) = (record.get(0), record.get(1)) else {
            continue;
        };
        if !flag.eq_ignore_ascii_case("true") {
            continue;
        }
        let day: TradingDay = date.parse().map_err(|_| CalendarError::InvalidDay {
            line: record.position().map_or(0, csv::Position::line),
            value: date.to_string(),
        })?;
        days.push(day);
    }

    Ok(TradingCalendar::from_days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_trading_rows_only() {
        let data = "date,is_open\n20230109,true\n20230107,false\n20230106,true\n\n20230110,TRUE\n";
        let cal = from_csv_reader(data.as_bytes()).unwrap();
        let days: Vec<String> = cal.days().iter().map(ToString::to_string).collect();
        assert_eq!(days, ["20230106", "20230109", "20230110"]);
    }

    #[test]
    fn test_invalid_trading_date() {
        let data = "20230109,true\n2023-01-10,true\n";
        let err = from_csv_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidDay { line: 2, .. }));
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "20230106,true").unwrap();
        writeln!(file, "20230109,true").unwrap();
        let cal = load_csv(file.path()).unwrap();
        assert_eq!(cal.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv("/nonexistent/calendar.csv").unwrap_err();
        assert!(matches!(err, CalendarError::Read { .. }));
    }
}
