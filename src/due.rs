//! Due date parsing and display helpers.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Parse human-readable due date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "mon".."sunday", "this friday", "next monday"
/// - "end of week" / "eow", "end of month" / "eom"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let weekday = today.weekday().num_days_from_monday() as i64;
            return Some(today + Duration::days(6 - weekday));
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let split = rest.char_indices().last().map_or(0, |(i, _)| i);
        let (num, unit) = rest.split_at(split);
        if let Ok(n) = num.trim().parse::<i64>() {
            // Out-of-range offsets are not dates; the caller keeps the text as typed.
            let offset = match unit {
                "d" => Duration::try_days(n),
                "w" => Duration::try_weeks(n),
                // Approximate: 30 days per month
                "m" => n.checked_mul(30).and_then(Duration::try_days),
                _ => None,
            };
            return offset.and_then(|o| today.checked_add_signed(o));
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == name || s == format!("this {name}") {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {name}") {
            let days = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Turn recognised due date input into an ISO date; anything else is kept trimmed.
pub fn normalise_due(input: &str) -> String {
    let today = Local::now().date_naive();
    match parse_due_input(input, today) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => input.trim().to_string(),
    }
}

/// Format a stored due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: &str, today: NaiveDate) -> String {
    match NaiveDate::parse_from_str(due.trim(), "%Y-%m-%d") {
        Err(_) if due.trim().is_empty() => "-".into(),
        Err(_) => due.trim().to_string(),
        Ok(d) => {
            let days = (d - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    #[test]
    fn test_parse_keywords() {
        let today = wednesday();
        assert_eq!(parse_due_input("Today", today), Some(today));
        assert_eq!(parse_due_input("tomorrow", today), NaiveDate::from_ymd_opt(2024, 5, 16));
        assert_eq!(parse_due_input("in 3d", today), NaiveDate::from_ymd_opt(2024, 5, 18));
        assert_eq!(parse_due_input("in 2w", today), NaiveDate::from_ymd_opt(2024, 5, 29));
        assert_eq!(parse_due_input("eom", today), NaiveDate::from_ymd_opt(2024, 5, 31));
        assert_eq!(parse_due_input("eow", today), NaiveDate::from_ymd_opt(2024, 5, 19));
    }

    #[test]
    fn test_huge_relative_offsets_are_rejected() {
        let today = wednesday();
        assert_eq!(parse_due_input("in 99999999d", today), None);
        assert_eq!(parse_due_input("in 9223372036854775807w", today), None);
        assert_eq!(parse_due_input("in 9223372036854775807m", today), None);
        assert_eq!(normalise_due("in 99999999d"), "in 99999999d");
    }

    #[test]
    fn test_parse_weekdays() {
        let today = wednesday();
        assert_eq!(parse_due_input("friday", today), NaiveDate::from_ymd_opt(2024, 5, 17));
        assert_eq!(parse_due_input("wed", today), Some(today));
        assert_eq!(parse_due_input("next wed", today), NaiveDate::from_ymd_opt(2024, 5, 22));
        assert_eq!(parse_due_input("next monday", today), NaiveDate::from_ymd_opt(2024, 5, 27));
    }

    #[test]
    fn test_parse_iso_and_garbage() {
        let today = wednesday();
        assert_eq!(parse_due_input("2024-12-01", today), NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(parse_due_input("someday", today), None);
        assert_eq!(normalise_due(" someday "), "someday");
        assert_eq!(normalise_due("2024-12-01"), "2024-12-01");
    }

    #[test]
    fn test_format_due_relative() {
        let today = wednesday();
        assert_eq!(format_due_relative("2024-05-15", today), "today");
        assert_eq!(format_due_relative("2024-05-16", today), "tomorrow");
        assert_eq!(format_due_relative("2024-05-20", today), "in 5d");
        assert_eq!(format_due_relative("2024-05-13", today), "2d late");
        assert_eq!(format_due_relative("", today), "-");
        assert_eq!(format_due_relative("soon", today), "soon");
    }
}
