use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{2}:\d{2})").unwrap());
static HEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)m").unwrap());

/// One tide event: clock time and water height in metres. Either half can be
/// absent; a day with no afternoon high water is normal near the solstices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reading {
    pub time: Option<String>,
    pub height: Option<f64>,
}

impl Reading {
    pub fn is_empty(&self) -> bool {
        self.time.is_none() && self.height.is_none()
    }
}

/// Pull time and height out of one table cell. Cells look like
/// `🕐11:54<br> 4.23m`, but the clock glyph arrives in several encodings and
/// is sometimes missing, so only the `HH:MM` and `N.NNm` shapes are trusted.
/// An empty or unreadable cell yields an empty reading, never an error.
pub fn extract_reading(cell: &str) -> Reading {
    let time = TIME_RE
        .captures(cell)
        .map(|caps| caps[1].to_string());
    let height = HEIGHT_RE
        .captures(cell)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    Reading { time, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cell() {
        let r = extract_reading("🕐11:54<br> 4.23m");
        assert_eq!(r.time.as_deref(), Some("11:54"));
        assert_eq!(r.height, Some(4.23));
    }

    #[test]
    fn mojibake_clock_glyph() {
        // The page sometimes serves the glyph in a broken encoding
        let r = extract_reading("ðŸ•11:54<br> 4.23m");
        assert_eq!(r.time.as_deref(), Some("11:54"));
        assert_eq!(r.height, Some(4.23));
    }

    #[test]
    fn no_glyph() {
        let r = extract_reading("11:54 4.23m");
        assert_eq!(r.time.as_deref(), Some("11:54"));
        assert_eq!(r.height, Some(4.23));
    }

    #[test]
    fn empty_cell() {
        assert!(extract_reading("").is_empty());
        assert!(extract_reading("   ").is_empty());
    }

    #[test]
    fn time_only() {
        let r = extract_reading("🕐06:12");
        assert_eq!(r.time.as_deref(), Some("06:12"));
        assert_eq!(r.height, None);
    }

    #[test]
    fn height_only() {
        let r = extract_reading("4.23m");
        assert_eq!(r.time, None);
        assert_eq!(r.height, Some(4.23));
    }

    #[test]
    fn integer_height() {
        let r = extract_reading("🕐00:05<br> 5m");
        assert_eq!(r.height, Some(5.0));
    }

    #[test]
    fn bare_unit_is_not_a_height() {
        let r = extract_reading("m");
        assert_eq!(r.height, None);
    }

    #[test]
    fn first_match_wins() {
        let r = extract_reading("🕐05:39 1.84m / 🕐18:06 1.54m");
        assert_eq!(r.time.as_deref(), Some("05:39"));
        assert_eq!(r.height, Some(1.84));
    }

    #[test]
    fn markup_noise_ignored() {
        let r = extract_reading("<span class=\"tide\">🕐11:54</span><br> <b>4.23m</b>");
        assert_eq!(r.time.as_deref(), Some("11:54"));
        assert_eq!(r.height, Some(4.23));
    }
}
