//! Formatting and reply-word helpers

use crate::session::ExpenseRef;
use chrono::NaiveDate;

pub(crate) fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub(crate) fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn normalized(message: &str) -> String {
    message
        .trim()
        .trim_end_matches(['.', '!'])
        .trim()
        .to_lowercase()
}

pub(crate) fn is_yes(message: &str) -> bool {
    matches!(normalized(message).as_str(), "yes" | "y")
}

pub(crate) fn is_commit(message: &str) -> bool {
    matches!(
        normalized(message).as_str(),
        "yes" | "y" | "confirm" | "save"
    )
}

pub(crate) fn is_no(message: &str) -> bool {
    matches!(normalized(message).as_str(), "no" | "n" | "cancel")
}

pub(crate) fn is_all(message: &str) -> bool {
    normalized(message) == "all"
}

/// A bare 1-based number such as "2" or "#2"
pub(crate) fn selection(message: &str) -> Option<usize> {
    normalized(message).trim_start_matches('#').parse().ok()
}

/// "📝 Coffee - $5.00 (Food) on March 3, 2026"
pub(crate) fn describe(expense: &ExpenseRef) -> String {
    format!(
        "📝 {} - {} ({}) on {}",
        expense.text,
        money(expense.amount),
        expense.category,
        long_date(expense.date)
    )
}

/// Numbered lines, 1-based
pub(crate) fn numbered(expenses: &[ExpenseRef]) -> String {
    expenses
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{}. {} - {} ({}) on {}",
                i + 1,
                e.text,
                money(e.amount),
                e.category,
                long_date(e.date)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) const FIELD_PROMPT: &str =
    "What would you like to change? Reply with **description**, **amount** or **category**.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_words() {
        assert!(is_yes(" Yes! "));
        assert!(!is_yes("yes please"));
        assert!(is_commit("save"));
        assert!(is_no("N"));
        assert!(is_all("ALL"));
        assert_eq!(selection("#2"), Some(2));
        assert_eq!(selection("two"), None);
    }

    #[test]
    fn test_money_and_date() {
        assert_eq!(money(5.0), "$5.00");
        assert_eq!(money(12.5), "$12.50");
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert_eq!(long_date(date), "August 1, 2026");
    }
}
