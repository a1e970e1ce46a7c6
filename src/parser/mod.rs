pub mod date;
pub mod reading;
pub mod row;

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

pub use reading::{extract_reading, Reading};
pub use row::{parse_fragment, RowError};

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<tr[^>]*class="row-\d+[^"]*"[^>]*>(.*?)</tr>"#).unwrap());

/// One calendar day of tide observations for the configured port. Where the
/// record belongs is decided at store time, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TideRecord {
    pub date: NaiveDate,
    pub morning_high: Reading,
    pub afternoon_high: Reading,
    pub morning_low: Reading,
    pub afternoon_low: Reading,
}

/// What one pass over a page produced.
#[derive(Debug)]
pub struct ParsedDocument {
    pub records: Vec<TideRecord>,
    /// Data rows that yielded no record. Markup without the row marker is
    /// not data and is not counted.
    pub skipped: usize,
}

/// Walk every `row-N` table row in document order. The full tide table is
/// served with most rows hidden behind `display: none`, so no visibility
/// filtering happens here. Rows that fail to parse are counted and logged,
/// never fatal.
pub fn parse_document(html: &str) -> ParsedDocument {
    let mut records = Vec::new();
    let mut skipped = 0;

    for caps in ROW_RE.captures_iter(html) {
        match row::parse_fragment(&caps[1]) {
            Ok(record) => records.push(record),
            Err(RowError::MissingDate) => {
                skipped += 1;
                debug!("Skipping row without a date");
            }
            Err(RowError::InvalidDate(text)) => {
                skipped += 1;
                warn!("Skipping row with unparseable date: {:?}", text);
            }
        }
    }

    ParsedDocument { records, skipped }
}
