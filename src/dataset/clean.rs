use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical date format of the normalized dataset.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Dash look-alikes that show up in hand-edited spreadsheets.
const ALTERNATE_DASHES: &[char] = &[
    '\u{2010}', // hyphen
    '\u{2011}', // non-breaking hyphen
    '\u{2012}', // figure dash
    '\u{2013}', // en dash
    '\u{2014}', // em dash
    '\u{2212}', // minus sign
];

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// 1) Replace alternate dashes with `-` and trim surrounding whitespace.
pub fn clean_date_text(raw: &str) -> String {
    raw.replace(ALTERNATE_DASHES, "-").trim().to_string()
}

/// Exactly `DDDD-DD-DD`: four-digit year, two-digit month and day.
fn has_date_layout(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

/// 2) Strict `YYYY-MM-DD` parse of a cleaned date. No fallback formats.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = clean_date_text(raw);
    // chrono's %Y alone also takes short and signed years
    if !has_date_layout(&s) {
        return None;
    }
    NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()
}

/// First contiguous run of ASCII digits, e.g. `"4 May"` → `4`.
pub fn extract_duration(raw: &str) -> Option<u32> {
    DIGIT_RUN.find(raw)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn en_dash_date_matches_hyphen_date() {
        let hyphen = parse_date("2019-06-03").unwrap();
        assert_eq!(parse_date("2019\u{2013}06\u{2013}03"), Some(hyphen));
        assert_eq!(parse_date("  2019\u{2014}06-03 "), Some(hyphen));
        assert_eq!(clean_date_text(" 2019\u{2013}06\u{2013}03\t"), "2019-06-03");
    }

    #[test]
    fn rejects_other_formats() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date("03/06/2019"), None);
        assert_eq!(parse_date("2019-06-03 10:00:00"), None);
        assert_eq!(parse_date("2019-02-30"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn year_must_have_four_digits() {
        for raw in [
            "19-06-03",
            "0-1-1",
            "-2019-06-03",
            "+2019-06-03",
            "+200000-01-01",
            "2019-6-3",
            "02019-06-03",
        ] {
            assert_eq!(parse_date(raw), None, "{raw:?} should be rejected");
        }
        assert_eq!(parse_date("0999-12-31"), NaiveDate::from_ymd_opt(999, 12, 31));
    }

    #[test]
    fn duration_takes_first_digit_run() {
        assert_eq!(extract_duration("4 May"), Some(4));
        assert_eq!(extract_duration("12 days"), Some(12));
        assert_eq!(extract_duration("about 3-5 days"), Some(3));
        assert_eq!(extract_duration("none"), None);
        assert_eq!(extract_duration(""), None);
        assert_eq!(extract_duration("99999999999 days"), None);
    }
}
