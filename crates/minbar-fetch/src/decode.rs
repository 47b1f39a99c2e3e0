//! Streaming decoder for depth-market-data XML.
//!
//! Each record is a `NtfDepthMarketDataPackage` element whose child elements
//! carry the tick fields as attributes. Unknown children and attributes are
//! ignored; absent numeric fields stay zero.

use std::io::BufRead;

use minbar_types::{MinbarError, Tick};
use quick_xml::{
    Reader,
    encoding::Decoder,
    events::{BytesStart, Event, attributes::AttrError},
};
use thiserror::Error;

/// Element name of a single tick record.
pub const PACKAGE_ELEMENT: &[u8] = b"NtfDepthMarketDataPackage";

/// Errors raised while decoding tick XML.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Malformed XML or an I/O failure underneath the reader.
    #[error("XML error at byte {position}: {source}")]
    Xml {
        /// Byte offset of the reader when the error surfaced.
        position: u64,
        /// Underlying reader error.
        #[source]
        source: quick_xml::Error,
    },

    /// An attribute value could not be decoded or unescaped.
    #[error("undecodable attribute value: {0}")]
    Value(#[source] quick_xml::Error),

    /// Malformed attribute syntax.
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    /// A numeric attribute could not be parsed.
    #[error("invalid {field} value {value:?}")]
    InvalidNumber {
        /// Attribute name.
        field: &'static str,
        /// Raw attribute text.
        value: String,
    },

    /// The document ended inside a record.
    #[error("document ended inside a NtfDepthMarketDataPackage record")]
    UnexpectedEof,
}

impl From<DecodeError> for MinbarError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    UpdateTime,
    Base,
    Static,
    LastMatch,
    BestPrice,
    AveragePrice,
}

impl Group {
    fn from_element(name: &[u8]) -> Option<Self> {
        match name {
            b"MarketDataUpdateTimeField" => Some(Self::UpdateTime),
            b"MarketDataBaseField" => Some(Self::Base),
            b"MarketDataStaticField" => Some(Self::Static),
            b"MarketDataLastMatchField" => Some(Self::LastMatch),
            b"MarketDataBestPriceField" => Some(Self::BestPrice),
            b"MarketDataAveragePriceField" => Some(Self::AveragePrice),
            _ => None,
        }
    }
}

enum Step {
    Open,
    Empty,
    Eof,
    Skip,
}

/// Iterator over the ticks of one XML document.
///
/// Yields `Err` at most once; iteration stops after the first error.
#[derive(Debug)]
pub struct TickReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    records: u64,
    done: bool,
}

impl<R: BufRead> TickReader<R> {
    /// Wraps a buffered XML source.
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::with_capacity(1024),
            records: 0,
            done: false,
        }
    }

    /// Number of records decoded so far.
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    fn next_tick(&mut self) -> Result<Option<Tick>, DecodeError> {
        loop {
            self.buf.clear();
            let step = match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) if e.local_name().as_ref() == PACKAGE_ELEMENT => Step::Open,
                Ok(Event::Empty(e)) if e.local_name().as_ref() == PACKAGE_ELEMENT => Step::Empty,
                Ok(Event::Eof) => Step::Eof,
                Ok(_) => Step::Skip,
                Err(source) => {
                    let position = self.reader.buffer_position();
                    return Err(DecodeError::Xml { position, source });
                }
            };
            match step {
                Step::Open => return self.read_package().map(Some),
                Step::Empty => return Ok(Some(Tick::default())),
                Step::Eof => return Ok(None),
                Step::Skip => {}
            }
        }
    }

    fn read_package(&mut self) -> Result<Tick, DecodeError> {
        let mut tick = Tick::default();
        loop {
            self.buf.clear();
            let decoder = self.reader.decoder();
            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e) | Event::Empty(e)) => apply_group(&mut tick, &e, decoder)?,
                Ok(Event::End(e)) if e.local_name().as_ref() == PACKAGE_ELEMENT => return Ok(tick),
                Ok(Event::Eof) => return Err(DecodeError::UnexpectedEof),
                Ok(_) => {}
                Err(source) => {
                    let position = self.reader.buffer_position();
                    return Err(DecodeError::Xml { position, source });
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for TickReader<R> {
    type Item = Result<Tick, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_tick() {
            Ok(Some(tick)) => {
                self.records += 1;
                Some(Ok(tick))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn apply_group(
    tick: &mut Tick,
    element: &BytesStart<'_>,
    decoder: Decoder,
) -> Result<(), DecodeError> {
    let Some(group) = Group::from_element(element.local_name().as_ref()) else {
        return Ok(());
    };

    for attr in element.attributes() {
        let attr = attr?;
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(DecodeError::Value)?;
        let value = value.trim();

        match (group, attr.key.local_name().as_ref()) {
            (Group::UpdateTime, b"InstrumentID") => tick.instrument_id = value.to_string(),
            (Group::UpdateTime, b"UpdateTime") => tick.update_time = value.to_string(),
            (Group::UpdateTime, b"UpdateMillisec") => tick.update_millisec = millisec(value)?,
            (Group::UpdateTime, b"ActionDay") => tick.action_day = non_empty(value),
            (Group::Base, b"TradingDay") => tick.trading_day = non_empty(value),
            (Group::Static, b"UpperLimitPrice") => {
                tick.upper_limit_price = float(value, "UpperLimitPrice")?;
            }
            (Group::Static, b"LowerLimitPrice") => {
                tick.lower_limit_price = float(value, "LowerLimitPrice")?;
            }
            (Group::LastMatch, b"LastPrice") => tick.last_price = float(value, "LastPrice")?,
            (Group::LastMatch, b"Volume") => tick.volume = int(value, "Volume")?,
            (Group::LastMatch, b"Turnover") => tick.turnover = float(value, "Turnover")?,
            (Group::LastMatch, b"OpenInterest") => {
                tick.open_interest = float(value, "OpenInterest")?;
            }
            (Group::BestPrice, b"BidPrice1") => tick.bid_price1 = float(value, "BidPrice1")?,
            (Group::BestPrice, b"BidVolume1") => tick.bid_volume1 = int(value, "BidVolume1")?,
            (Group::BestPrice, b"AskPrice1") => tick.ask_price1 = float(value, "AskPrice1")?,
            (Group::BestPrice, b"AskVolume1") => tick.ask_volume1 = int(value, "AskVolume1")?,
            (Group::AveragePrice, b"AveragePrice") => {
                tick.average_price = float(value, "AveragePrice")?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn millisec(value: &str) -> Result<i32, DecodeError> {
    const FIELD: &str = "UpdateMillisec";
    let millis = int(value, FIELD)?;
    i32::try_from(millis).map_err(|_| invalid(FIELD, value))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn float(value: &str, field: &'static str) -> Result<f64, DecodeError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    value.parse().map_err(|_| invalid(field, value))
}

/// Integer fields occasionally arrive as `"12.0"`; whole floats are accepted.
fn int(value: &str, field: &'static str) -> Result<i64, DecodeError> {
    if value.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = value.parse::<i64>() {
        return Ok(n);
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(invalid(field, value)),
    }
}

fn invalid(field: &'static str, value: &str) -> DecodeError {
    DecodeError::InvalidNumber {
        field,
        value: value.to_string(),
    }
}
