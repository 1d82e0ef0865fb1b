//! Fuzzy Lookup Resolver
//!
//! Turns a natural-language date phrase ("August 1st", "aug 1", "yesterday",
//! "July") into a [`DateQuery`] and filters a user's records with it.
//!
//! Matching is token based: a day number only matches as a whole token, so
//! "11 august" never matches records from August 1st.

use crate::parse::month_from_name;
use crate::records::ExpenseRecord;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static DATE_PHRASE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bspent\s+on\s+(.+?)(?:\s+and\b|\s*$)",
        r"(?i)\bon\s+(.+?)(?:\s+and\b|\s*$)",
        r"(?i)\bfrom\s+(.+?)(?:\s+and\b|\s*$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("date phrase patterns are compile-time constants"))
    .collect()
});

static RELATIVE_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(today|yesterday)\b").expect("RELATIVE_DAY is a compile-time constant")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("ISO_DATE is a compile-time constant")
});

static DAY_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?$").expect("DAY_TOKEN is a compile-time constant")
});

/// Isolate the date phrase of a smart delete/edit request.
///
/// "delete the expense on August 1st" yields "August 1st"; a bare
/// "today"/"yesterday" is used when no `on`/`from` phrase exists.
#[must_use]
pub fn extract_date_phrase(message: &str) -> Option<String> {
    let message = message.trim().trim_end_matches(['.', '!', '?']);

    DATE_PHRASE
        .iter()
        .find_map(|re| re.captures(message).map(|caps| caps[1].trim().to_string()))
        .filter(|phrase| !phrase.is_empty())
        .or_else(|| {
            RELATIVE_DAY
                .captures(message)
                .map(|caps| caps[1].to_lowercase())
        })
}

/// A parsed date description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateQuery {
    /// One calendar day
    Exact(NaiveDate),
    /// Day of a month, in any year unless one was given
    Day {
        /// Month (1-12)
        month: u32,
        /// Day of month
        day: u32,
        /// Year, if stated
        year: Option<i32>,
    },
    /// A whole month, in any year unless one was given
    Month {
        /// Month (1-12)
        month: u32,
        /// Year, if stated
        year: Option<i32>,
    },
}

impl DateQuery {
    /// Parse a date phrase relative to `today`
    #[must_use]
    pub fn parse(phrase: &str, today: NaiveDate) -> Option<Self> {
        let lower = phrase.to_lowercase();

        if let Some(caps) = RELATIVE_DAY.captures(&lower) {
            let date = match &caps[1] {
                "yesterday" => today.pred_opt()?,
                _ => today,
            };
            return Some(DateQuery::Exact(date));
        }

        if let Some(caps) = ISO_DATE.captures(&lower) {
            let date = NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            )?;
            return Some(DateQuery::Exact(date));
        }

        let mut month = None;
        let mut day = None;
        let mut year = None;
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            if let Some(m) = month_from_name(token) {
                month.get_or_insert(m);
            } else if let Some(caps) = DAY_TOKEN.captures(token) {
                if let Ok(d) = caps[1].parse::<u32>() {
                    if (1..=31).contains(&d) {
                        day.get_or_insert(d);
                    }
                }
            } else if token.len() == 4 {
                if let Ok(y) = token.parse::<i32>() {
                    year.get_or_insert(y);
                }
            }
        }

        match (month?, day) {
            (month, Some(day)) => Some(DateQuery::Day { month, day, year }),
            (month, None) => Some(DateQuery::Month { month, year }),
        }
    }

    /// Whether `date` satisfies the query
    #[must_use]
    pub fn matches(&self, date: NaiveDate) -> bool {
        match *self {
            DateQuery::Exact(exact) => date == exact,
            DateQuery::Day { month, day, year } => {
                date.month() == month
                    && date.day() == day
                    && year.is_none_or(|y| date.year() == y)
            }
            DateQuery::Month { month, year } => {
                date.month() == month && year.is_none_or(|y| date.year() == y)
            }
        }
    }
}

/// Records whose date matches the phrase, in their original order.
///
/// An unparseable phrase matches nothing.
#[must_use]
pub fn find_candidates(
    records: &[ExpenseRecord],
    phrase: &str,
    today: NaiveDate,
) -> Vec<ExpenseRecord> {
    let Some(query) = DateQuery::parse(phrase, today) else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|r| query.matches(r.date))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use chrono::Utc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, date: NaiveDate) -> ExpenseRecord {
        ExpenseRecord {
            id: id.to_string(),
            user_id: "u1".to_string(),
            text: format!("expense {}", id),
            amount: 10.0,
            category: Category::Other,
            date,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_extract_date_phrase() {
        assert_eq!(
            extract_date_phrase("delete the expense on August 1st").as_deref(),
            Some("August 1st")
        );
        assert_eq!(
            extract_date_phrase("remove my expense from yesterday and").as_deref(),
            Some("yesterday")
        );
        assert_eq!(
            extract_date_phrase("edit what I spent on 3rd july.").as_deref(),
            Some("3rd july")
        );
        assert_eq!(
            extract_date_phrase("delete today's coffee").as_deref(),
            Some("today")
        );
        assert_eq!(extract_date_phrase("delete something"), None);
    }

    #[test]
    fn test_parse_query_forms() {
        let today = ymd(2026, 8, 15);
        assert_eq!(
            DateQuery::parse("yesterday", today),
            Some(DateQuery::Exact(ymd(2026, 8, 14)))
        );
        assert_eq!(
            DateQuery::parse("2026-08-01", today),
            Some(DateQuery::Exact(ymd(2026, 8, 1)))
        );
        assert_eq!(
            DateQuery::parse("1st August", today),
            Some(DateQuery::Day {
                month: 8,
                day: 1,
                year: None
            })
        );
        assert_eq!(
            DateQuery::parse("aug 1, 2025", today),
            Some(DateQuery::Day {
                month: 8,
                day: 1,
                year: Some(2025)
            })
        );
        assert_eq!(
            DateQuery::parse("july", today),
            Some(DateQuery::Month {
                month: 7,
                year: None
            })
        );
        assert_eq!(DateQuery::parse("last tuesday", today), None);
    }

    #[test]
    fn test_day_tokens_do_not_overlap() {
        let records = vec![record("a", ymd(2026, 8, 1)), record("b", ymd(2026, 8, 11))];
        let today = ymd(2026, 8, 15);

        let first: Vec<String> = find_candidates(&records, "1st august", today)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(first, vec!["a"]);

        let eleventh: Vec<String> = find_candidates(&records, "11 august", today)
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(eleventh, vec!["b"]);
    }

    #[test]
    fn test_month_query_and_unparseable_phrase() {
        let records = vec![
            record("a", ymd(2026, 8, 1)),
            record("b", ymd(2026, 7, 3)),
            record("c", ymd(2025, 8, 20)),
        ];
        let today = ymd(2026, 8, 15);

        assert_eq!(find_candidates(&records, "august", today).len(), 2);
        assert_eq!(find_candidates(&records, "august 2025", today).len(), 1);
        assert!(find_candidates(&records, "the other day", today).is_empty());
    }
}
