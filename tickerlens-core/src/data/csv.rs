//! CSV-backed market data source.
//!
//! Reads `date,open,high,low,close,volume` rows and repairs the usual
//! export damage: rows arrive unsorted, dates show up twice, prices carry
//! sub-cent noise, and the odd row is junk. Junk rows are dropped rather
//! than failing the whole file; only a structurally unreadable stream is
//! an error.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use ::csv::{ReaderBuilder, StringRecord, Trim};
use chrono::{Duration, NaiveDate, Utc};
use tracing::warn;

use crate::domain::OhlcvBar;

use super::provider::{MarketDataError, MarketDataSource};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Daily bars from a single-symbol CSV file.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MarketDataSource for CsvSource {
    fn fetch(&self, symbol: &str) -> Result<Vec<OhlcvBar>, MarketDataError> {
        let file = File::open(&self.path)?;
        let bars = parse_bars(file, Utc::now().date_naive())?;
        if bars.is_empty() {
            return Err(MarketDataError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}

/// Parse and clean a CSV stream. `today` anchors the future-date cutoff:
/// anything past tomorrow is discarded.
fn parse_bars<R: Read>(input: R, today: NaiveDate) -> Result<Vec<OhlcvBar>, MarketDataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let cutoff = today + Duration::days(1);
    let mut bars: Vec<OhlcvBar> = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = record.map_err(|err| MarketDataError::Parse(err.to_string()))?;
        match parse_row(&record, cutoff) {
            Some(bar) => bars.push(bar),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(dropped, "discarded unusable csv rows");
    }

    // Stable sort keeps file order within a date, so the last occurrence
    // of a duplicated date is the one that survives deduplication.
    bars.sort_by_key(|bar| bar.date);
    let mut deduped: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }
    Ok(deduped)
}

fn parse_row(record: &StringRecord, cutoff: NaiveDate) -> Option<OhlcvBar> {
    let date = NaiveDate::parse_from_str(record.get(0)?, DATE_FORMAT).ok()?;
    if date > cutoff {
        return None;
    }
    let open = parse_price(record.get(1)?)?;
    let high = parse_price(record.get(2)?)?;
    let low = parse_price(record.get(3)?)?;
    let close = parse_price(record.get(4)?)?;
    let volume = record
        .get(5)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)?;
    Some(OhlcvBar {
        date,
        open,
        high,
        low,
        close,
        volume,
    })
}

/// A price field must be a finite positive number; it is rounded to cents.
fn parse_price(field: &str) -> Option<f64> {
    let value = field.parse::<f64>().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some((value * 100.0).round() / 100.0)
}
