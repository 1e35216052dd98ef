/// Utility functions
use chrono::NaiveDate;

/// Validate a calendar date string (YYYY-MM-DD); invalid input collapses to None
pub fn valid_date(date: Option<&str>) -> Option<&str> {
    let d = date?;
    NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()?;
    Some(d)
}

/// Parse a sol query value, falling back to the default on bad input
pub fn coerce_sol(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.parse::<u32>().ok()).unwrap_or(default)
}

/// Title-case an identifier: uppercase the first letter of each
/// alphabetic run, lowercase the rest ("curiosity" -> "Curiosity")
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Truncate a string to at most `max` characters, respecting char boundaries
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_date_accepts_iso() {
        assert_eq!(valid_date(Some("2024-05-01")), Some("2024-05-01"));
    }

    #[test]
    fn test_valid_date_rejects_garbage() {
        assert_eq!(valid_date(Some("not-a-date")), None);
        assert_eq!(valid_date(Some("2024-13-01")), None);
        assert_eq!(valid_date(Some("2024-02-30")), None);
    }

    #[test]
    fn test_valid_date_passes_through_none() {
        assert_eq!(valid_date(None), None);
    }

    #[test]
    fn test_coerce_sol_parses_integer() {
        assert_eq!(coerce_sol(Some("42"), 1000), 42);
    }

    #[test]
    fn test_coerce_sol_defaults_on_garbage() {
        assert_eq!(coerce_sol(Some("abc"), 1000), 1000);
        assert_eq!(coerce_sol(Some("-5"), 1000), 1000);
        assert_eq!(coerce_sol(None, 1000), 1000);
    }

    #[test]
    fn test_title_case_single_word() {
        assert_eq!(title_case("curiosity"), "Curiosity");
    }

    #[test]
    fn test_title_case_multi_word() {
        assert_eq!(title_case("mars rover"), "Mars Rover");
    }

    #[test]
    fn test_title_case_preserves_separators() {
        assert_eq!(title_case("PERSEVERANCE-2"), "Perseverance-2");
    }

    #[test]
    fn test_truncate_chars_short_string_untouched() {
        assert_eq!(truncate_chars("hello", 500), "hello");
    }

    #[test]
    fn test_truncate_chars_cuts_long_string() {
        let long = "x".repeat(600);
        assert_eq!(truncate_chars(&long, 500).chars().count(), 500);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        // multibyte chars must not be split
        let s = "日本語のテキスト";
        assert_eq!(truncate_chars(s, 3), "日本語");
    }
}
