//! Archive fixtures for pipeline tests.

use std::path::Path;

use flate2::{Compression, write::GzEncoder};
use minbar_calendar::TradingCalendar;
use minbar_types::TradingDay;

pub(crate) fn day(s: &str) -> TradingDay {
    s.parse().unwrap()
}

pub(crate) fn calendar(days: &[&str]) -> TradingCalendar {
    TradingCalendar::from_days(days.iter().copied().map(day))
}

pub(crate) fn tick_xml(id: &str, time: &str, last: f64, volume: i64) -> String {
    format!(
        r#"<NtfDepthMarketDataPackage>
<MarketDataUpdateTimeField InstrumentID="{id}" UpdateTime="{time}" UpdateMillisec="0"/>
<MarketDataLastMatchField LastPrice="{last}" Volume="{volume}" Turnover="0" OpenInterest="1000"/>
<MarketDataBestPriceField BidPrice1="{bid}" BidVolume1="1" AskPrice1="{ask}" AskVolume1="1"/>
</NtfDepthMarketDataPackage>
"#,
        bid = last - 1.0,
        ask = last + 1.0,
    )
}

/// One rb2305 night-session minute and two day-session minutes.
pub(crate) fn session_ticks() -> Vec<String> {
    vec![
        tick_xml("rb2305", "21:00:10", 3890.0, 10),
        tick_xml("rb2305", "21:00:20", 3891.0, 20),
        tick_xml("rb2305", "09:01:10", 3900.0, 100),
        tick_xml("rb2305", "09:01:40", 3902.0, 120),
        tick_xml("rb2305", "09:02:05", 3901.0, 150),
        tick_xml("rb2305", "09:02:30", 3899.0, 170),
    ]
}

pub(crate) fn archive_bytes(ticks: &[String]) -> Vec<u8> {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Ticks>\n");
    for tick in ticks {
        xml.push_str(tick);
    }
    xml.push_str("</Ticks>\n");

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));
    let mut header = tar::Header::new_gnu();
    header.set_size(xml.len() as u64);
    header.set_mode(0o644);
    builder
        .append_data(&mut header, "ticks.xml", xml.as_bytes())
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

pub(crate) fn write_archive(dir: &Path, trading_day: &str, ticks: &[String]) {
    let path = dir.join(format!("{trading_day}.tar.gz"));
    std::fs::write(path, archive_bytes(ticks)).unwrap();
}
