//! JSON output format.

use std::io::Write;

use minbar_aggregate::FinalizedBar;

use crate::{FormatError, Formatter};

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// A single `[...]` document.
    #[default]
    Array,
    /// One bar object per line.
    Ndjson,
}

/// JSON formatter.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    style: JsonStyle,
    /// Only honored by the array style.
    pretty: bool,
}

impl JsonFormatter {
    /// Creates an array-style formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Array,
            pretty: false,
        }
    }

    /// Creates an NDJSON formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
            pretty: false,
        }
    }

    /// Indents array output. Ignored for line-delimited output.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Switches between array and line-delimited output.
    #[must_use]
    pub const fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }
}

impl Formatter for JsonFormatter {
    fn write_bars<W: Write + Send>(
        &self,
        bars: &[FinalizedBar],
        mut writer: W,
    ) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Array => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut writer, bars)?;
                } else {
                    serde_json::to_writer(&mut writer, bars)?;
                }
                writeln!(writer)?;
            }
            JsonStyle::Ndjson => {
                for bar in bars {
                    serde_json::to_writer(&mut writer, bar)?;
                    writeln!(writer)?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        match self.style {
            JsonStyle::Array => "json",
            JsonStyle::Ndjson => "ndjson",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::bar;

    #[test]
    fn test_json_array() {
        let bars = vec![bar("rb2305", 1, 3901.0, 10)];
        let mut output = Vec::new();
        JsonFormatter::new().write_bars(&bars, &mut output).unwrap();

        let result = String::from_utf8(output).unwrap();
        assert!(result.starts_with('['));
        assert!(result.contains("\"instrument_id\":\"rb2305\""));
        assert!(result.contains("\"trading_day\":\"20230110\""));
        assert!(result.contains("\"timestamp\":\"2023-01-10T09:01:00\""));
    }

    #[test]
    fn test_ndjson() {
        let bars = vec![bar("rb2305", 1, 3901.0, 10), bar("rb2305", 2, 3902.0, 4)];
        let mut output = Vec::new();
        let formatter = JsonFormatter::ndjson();
        formatter.write_bars(&bars, &mut output).unwrap();

        let result = String::from_utf8(output).unwrap();
        let lines: Vec<_> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: FinalizedBar = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, bars[1]);
    }

    #[test]
    fn test_pretty_json() {
        let bars = vec![bar("rb2305", 1, 3901.0, 10)];
        let mut output = Vec::new();
        JsonFormatter::new()
            .with_pretty(true)
            .write_bars(&bars, &mut output)
            .unwrap();

        let result = String::from_utf8(output).unwrap();
        assert!(result.contains("\n  "));
    }

    #[test]
    fn test_extension() {
        assert_eq!(JsonFormatter::new().extension(), "json");
        let ndjson = JsonFormatter::new().with_style(JsonStyle::Ndjson);
        assert_eq!(ndjson.extension(), "ndjson");
    }
}
