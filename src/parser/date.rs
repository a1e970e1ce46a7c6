use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const DATE_FORMATS: &[&str] = &["%d %B %Y", "%d %b %Y"];

/// Turn a raw date cell into a calendar date. The page writes dates as
/// `29&nbsp;December&nbsp;2025`, sometimes with the entity already decoded to
/// U+00A0 and sometimes with stray newlines, so the text is flattened to
/// single spaces before matching. Returns `None` for anything that does not
/// resolve to a real date (including shapes like "31 February 2025").
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = clean(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}

fn clean(raw: &str) -> String {
    let decoded = raw.replace("&nbsp;", " ").replace('\u{a0}', " ");
    WS_RE.replace_all(&decoded, " ").trim().to_string()
}
