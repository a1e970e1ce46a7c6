use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::date::parse_date;
use super::reading::extract_reading;
use super::TideRecord;

static CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<td([^>]*)>(.*?)</td>").unwrap());

/// Why a table row produced no record.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    /// No date cell, or a blank one. Header, separator and template rows land here.
    #[error("row has no date")]
    MissingDate,
    /// A date cell was present but its text is not a calendar date.
    #[error("unparseable date {0:?}")]
    InvalidDate(String),
}

/// The five cell texts of one table row, slotted by column.
#[derive(Debug, Default)]
struct RawRow {
    date: Option<String>,
    /// morning high, afternoon high, morning low, afternoon low
    readings: [Option<String>; 4],
}

/// Parse one `<tr>` fragment (the element or just its inner HTML) into a
/// record. Everything hinges on the date: a row without one is not data, and
/// a row with a broken one is reported with the offending text. Reading cells
/// are best-effort; missing or empty ones become empty readings.
pub fn parse_fragment(html: &str) -> Result<TideRecord, RowError> {
    let raw = split_cells(html);

    let date_text = raw
        .date
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(RowError::MissingDate)?;
    let date = parse_date(date_text)
        .ok_or_else(|| RowError::InvalidDate(date_text.to_string()))?;

    let [morning_high, afternoon_high, morning_low, afternoon_low] = raw
        .readings
        .map(|cell| extract_reading(cell.as_deref().unwrap_or("")));

    Ok(TideRecord {
        date,
        morning_high,
        afternoon_high,
        morning_low,
        afternoon_low,
    })
}

/// Slot `<td>` contents by column. The page labels cells two ways, a
/// `data-th` attribute on the phone layout and `column-N` classes on the
/// desktop one; either is accepted. The first cell seen for a slot wins;
/// unrecognized cells are dropped.
fn split_cells(html: &str) -> RawRow {
    let mut raw = RawRow::default();
    for caps in CELL_RE.captures_iter(html) {
        let content = caps[2].to_string();
        match slot_for(&caps[1]) {
            Some(0) => {
                raw.date.get_or_insert(content);
            }
            Some(n) => {
                raw.readings[n - 1].get_or_insert(content);
            }
            None => {}
        }
    }
    raw
}

fn slot_for(attrs: &str) -> Option<usize> {
    if attrs.contains(r#"data-th="Date""#) || attrs.contains("column-1") {
        Some(0)
    } else if attrs.contains(r#"data-th="Morning high water""#) || attrs.contains("column-2") {
        Some(1)
    } else if attrs.contains(r#"data-th="Afternoon high water""#) || attrs.contains("column-3") {
        Some(2)
    } else if attrs.contains(r#"data-th="Morning low water""#) || attrs.contains("column-4") {
        Some(3)
    } else if attrs.contains(r#"data-th="Afternoon low water""#) || attrs.contains("column-5") {
        Some(4)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_ROW: &str = r#"<tr class="row-364" style="display: none;"><td class="column-1" data-th="Date">29&nbsp;December&nbsp;2025</td><td class="column-2" data-th="Morning high water">🕐11:54<br> 4.23m</td><td class="column-3" data-th="Afternoon high water"></td><td class="column-4" data-th="Morning low water">🕐05:39<br> 1.84m</td><td class="column-5" data-th="Afternoon low water">🕐18:06<br> 1.54m</td></tr>"#;

    #[test]
    fn sample_row() {
        let record = parse_fragment(SAMPLE_ROW).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 12, 29).unwrap());
        assert_eq!(record.morning_high.time.as_deref(), Some("11:54"));
        assert_eq!(record.morning_high.height, Some(4.23));
        assert!(record.afternoon_high.is_empty());
        assert_eq!(record.morning_low.time.as_deref(), Some("05:39"));
        assert_eq!(record.morning_low.height, Some(1.84));
        assert_eq!(record.afternoon_low.time.as_deref(), Some("18:06"));
        assert_eq!(record.afternoon_low.height, Some(1.54));
    }

    #[test]
    fn inner_html_only() {
        // The row command takes a fragment without the <tr> wrapper too
        let inner = r#"<td data-th="Date">1 March 2026</td><td data-th="Morning high water">🕐09:01<br> 4.02m</td>"#;
        let record = parse_fragment(inner).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(record.morning_high.height, Some(4.02));
        assert!(record.afternoon_low.is_empty());
    }

    #[test]
    fn column_classes_without_data_th() {
        let html = r#"<td class="column-1">2 March 2026</td><td class="column-4">🕐03:10<br> 1.12m</td>"#;
        let record = parse_fragment(html).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert!(record.morning_high.is_empty());
        assert_eq!(record.morning_low.time.as_deref(), Some("03:10"));
    }

    #[test]
    fn missing_date_cell() {
        let html = r#"<td class="column-2">🕐11:54<br> 4.23m</td>"#;
        assert_eq!(parse_fragment(html), Err(RowError::MissingDate));
    }

    #[test]
    fn blank_date_cell() {
        let html = r#"<td class="column-1">   </td><td class="column-2">🕐11:54<br> 4.23m</td>"#;
        assert_eq!(parse_fragment(html), Err(RowError::MissingDate));
    }

    #[test]
    fn unparseable_date() {
        let html = r#"<td class="column-1">TBC</td>"#;
        assert_eq!(
            parse_fragment(html),
            Err(RowError::InvalidDate("TBC".to_string()))
        );
    }

    #[test]
    fn no_cells_at_all() {
        assert_eq!(parse_fragment("<tr></tr>"), Err(RowError::MissingDate));
    }

    #[test]
    fn unrecognized_cells_dropped() {
        let html = r#"<td>junk</td><td class="column-1">3 March 2026</td><td class="sparkline">▂▄▆</td>"#;
        let record = parse_fragment(html).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert!(record.morning_high.is_empty());
    }

    #[test]
    fn duplicate_slot_keeps_first() {
        let html = r#"<td class="column-1">4 March 2026</td><td class="column-1">5 March 2026</td>"#;
        let record = parse_fragment(html).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    }
}
