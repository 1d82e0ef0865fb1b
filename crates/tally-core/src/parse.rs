//! Free-text slot parsing
//!
//! - Amounts: currency-like text (`$1,234.50`, `10`, `15.99 dollars`)
//! - Dates: `today`, `yesterday`, `1st August`, ISO and US numeric forms, month-name text
//! - Natural expense statements: `spent $X on Y`, `paid $X for Y`, `bought Y for $X`
//!
//! None of these return errors: amounts yield `None`, dates fall back to today.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

const AMOUNT: &str = r"(\d+(?:,\d{3})*(?:\.\d{1,2})?)";

/// (pattern, amount group index, description group index)
static NATURAL_EXPENSE: LazyLock<Vec<(Regex, usize, usize)>> = LazyLock::new(|| {
    [
        (format!(r"(?i)\bspent\s+\$?{AMOUNT}\s+on\s+(.+)"), 1, 2),
        (format!(r"(?i)\bbought\s+(.+?)\s+for\s+\$?{AMOUNT}"), 2, 1),
        (format!(r"(?i)\bpaid\s+\$?{AMOUNT}\s+for\s+(.+)"), 1, 2),
        (format!(r"(?i)\$?{AMOUNT}\s+for\s+(.+)"), 1, 2),
        (format!(r"(?i)\$?{AMOUNT}\s+on\s+(.+)"), 1, 2),
    ]
    .into_iter()
    .map(|(pattern, amount, description)| {
        let re = Regex::new(&pattern).expect("natural expense patterns are compile-time constants");
        (re, amount, description)
    })
    .collect()
});

static ORDINAL_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{1,2})(?:st|nd|rd|th)\s+(?:of\s+)?(january|february|march|april|may|june|july|august|september|october|november|december)",
    )
    .expect("ORDINAL_MONTH is a compile-time constant")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("ISO_DATE is a compile-time constant")
});

static US_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{4})").expect("US_DATE is a compile-time constant")
});

static ORDINAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)(?:st|nd|rd|th)\b").expect("ORDINAL_SUFFIX is a compile-time constant")
});

static FOUR_DIGIT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}\b").expect("FOUR_DIGIT_YEAR is a compile-time constant"));

const NATURAL_DATE_FORMATS: [&str; 4] = ["%B %d %Y", "%d %B %Y", "%b %d %Y", "%d %b %Y"];

/// Month number (1-12) for a full or abbreviated English month name
#[must_use]
pub fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parse a currency-like amount.
///
/// Everything except digits and `.` is stripped (thousands separators included),
/// then the longest numeric prefix is taken.
#[must_use]
pub fn parse_amount(input: &str) -> Option<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    (1..=cleaned.len())
        .rev()
        .find_map(|end| cleaned[..end].parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
}

/// Amount and description pulled from one sentence
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalExpense {
    /// Positive amount
    pub amount: f64,
    /// What the money was spent on
    pub description: String,
}

/// Parse statements like "I spent $12.50 on groceries"
#[must_use]
pub fn parse_natural_expense(message: &str) -> Option<NaturalExpense> {
    NATURAL_EXPENSE
        .iter()
        .find_map(|(re, amount_group, description_group)| {
            let caps = re.captures(message)?;
            let amount = caps
                .get(*amount_group)?
                .as_str()
                .replace(',', "")
                .parse::<f64>()
                .ok()?;
            let description = clean_description(caps.get(*description_group)?.as_str());

            (amount > 0.0 && description.chars().count() > 1).then_some(NaturalExpense {
                amount,
                description,
            })
        })
}

fn clean_description(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_string()
}

/// Parse a date reply. Unparseable input resolves to `today`.
#[must_use]
pub fn parse_date(input: &str, today: NaiveDate) -> NaiveDate {
    let lower = input.trim().to_lowercase();

    if lower.contains("today") {
        return today;
    }
    if lower.contains("yesterday") {
        return today.pred_opt().unwrap_or(today);
    }

    let parsed = parse_ordinal_month(&lower, today.year())
        .or_else(|| parse_numeric_date(&lower))
        .or_else(|| parse_natural_date(&lower, today.year()));

    match parsed {
        Some(date) => date,
        None => {
            debug!(input = %input, "Could not parse date, defaulting to today");
            today
        }
    }
}

fn parse_ordinal_month(lower: &str, current_year: i32) -> Option<NaiveDate> {
    let caps = ORDINAL_MONTH.captures(lower)?;
    let day = caps[1].parse().ok()?;
    let month = month_from_name(&caps[2])?;
    let year = FOUR_DIGIT_YEAR
        .find(lower)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(current_year);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_numeric_date(lower: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE.captures(lower) {
        return NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        );
    }

    let caps = US_DATE.captures(lower)?;
    NaiveDate::from_ymd_opt(
        caps[3].parse().ok()?,
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
    )
}

/// "4th July, 2025", "July 4", "aug 1 2024"
fn parse_natural_date(lower: &str, current_year: i32) -> Option<NaiveDate> {
    let stripped = ORDINAL_SUFFIX.replace_all(lower, "$1").replace(',', " ");
    let mut text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if !FOUR_DIGIT_YEAR.is_match(&text) {
        text.push_str(&format!(" {}", current_year));
    }

    NATURAL_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
        .filter(|date| date.year() > 1900)
}

#[cfg(test)]
mod tests;
