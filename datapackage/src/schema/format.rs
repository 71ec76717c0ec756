//! Translation of schema date/time format strings to strftime patterns.
//!
//! Schema formats use human tokens (`dd/mm/yyyy`). They are rewritten into
//! strftime directives by ordered, case-insensitive literal substitution.
//! The order matters: `:mm` (minutes) must be consumed before the bare `mm`
//! (month), and `yyyy` before `yy`.
//!
//! `hh` maps to `%m`, not `%H`. Descriptors in the wild were written
//! against that mapping, so it is kept as-is.

use std::sync::OnceLock;

use regex::{NoExpand, Regex};

/// Human token → strftime directive, applied in this order.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("hh", "%m"),
    (":mm", ":%M"),
    ("ss", "%S"),
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("mm", "%m"),
    ("dd", "%d"),
];

fn patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        REPLACEMENTS
            .iter()
            .map(|(token, directive)| {
                let pattern = format!("(?i){}", regex::escape(token));
                (Regex::new(&pattern).unwrap(), *directive)
            })
            .collect()
    })
}

/// Translate a schema format string into a strftime pattern.
///
/// # Examples
///
/// ```
/// use datapackage::schema::format::to_strftime;
///
/// assert_eq!(to_strftime("dd/mm/yyyy"), "%d/%m/%Y");
/// assert_eq!(to_strftime("YYYY-MM-DD"), "%Y-%m-%d");
/// ```
pub fn to_strftime(format: &str) -> String {
    patterns()
        .iter()
        .fold(format.to_string(), |acc, (pattern, directive)| {
            pattern.replace_all(&acc, NoExpand(directive)).into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_month_year() {
        assert_eq!(to_strftime("dd/mm/yyyy"), "%d/%m/%Y");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(to_strftime("DD.MM.YYYY"), "%d.%m.%Y");
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(to_strftime("mm/dd/yy"), "%m/%d/%y");
    }

    #[test]
    fn test_minutes_before_month() {
        assert_eq!(to_strftime("yyyy-mm-dd :mm:ss"), "%Y-%m-%d :%M:%S");
    }

    #[test]
    fn test_hours_token_maps_to_month_directive() {
        assert_eq!(to_strftime("hh:mm"), "%m:%M");
    }

    #[test]
    fn test_literals_untouched() {
        assert_eq!(to_strftime("T"), "T");
        assert_eq!(to_strftime(""), "");
    }
}
