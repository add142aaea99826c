// Utility helpers for parsing, rounding and number formatting.
//
// Export files are messy (blank cells, stray whitespace, odd dates), so all
// of the forgiving parsing lives here and the rest of the code works with
// clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Trim a cell and treat empty strings as missing.
pub fn clean_str(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

/// Parse a date cell. Accepts `YYYY-MM-DD`, optionally followed by a time
/// part (`2024-03-01T00:00:00`), since CRM exports vary.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let date_part = s.split(|c: char| c == 'T' || c == ' ').next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Round to one decimal place, the precision used for every percentage.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// `part / whole * 100`, rounded, with an empty whole giving 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}

/// A percentage as printed in tables and summaries: one decimal place.
pub fn format_pct(x: f64) -> String {
    let r = round1(x);
    // -0.0 prints as "-0.0"
    format!("{:.1}", if r == 0.0 { 0.0 } else { r })
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_str_trims_and_drops_blanks() {
        assert_eq!(clean_str(Some("  Auto ")), Some("Auto".to_string()));
        assert_eq!(clean_str(Some("   ")), None);
        assert_eq!(clean_str(None), None);
    }

    #[test]
    fn dates_with_time_suffix_parse() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date_safe(Some("2024-03-01")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-01T00:00:00.000+0000")), expected);
        assert_eq!(parse_date_safe(Some("03/01/2024")), None);
        assert_eq!(parse_date_safe(Some("")), None);
    }

    #[test]
    fn percentage_guards_zero_whole() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
    }

    #[test]
    fn numbers_format_for_display() {
        assert_eq!(format_pct(50.0), "50.0");
        assert_eq!(format_pct(66.66), "66.7");
        assert_eq!(format_pct(-12.04), "-12.0");
        assert_eq!(format_pct(-0.04), "0.0");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
