//! Local spending analysis
//!
//! Everything the analysis path can answer without the text generator:
//! date windows from phrases, totals, category breakdown and the biggest category.

use crate::category::Category;
use crate::parse::month_from_name;
use crate::records::{ExpenseRecord, RecordFilter};
use chrono::{Datelike, Months, NaiveDate};
use std::collections::HashMap;

/// Canned budgeting tips used for budget-style questions
pub const BUDGET_TIPS: &str = "💡 **Smart Budget Tips:**\n\n\
    • **Track Every Expense**: Log all spending, however small\n\
    • **50/30/20 Rule**: 50% needs, 30% wants, 20% savings\n\
    • **Review Monthly**: Check your spending patterns regularly\n\
    • **Set Category Limits**: Budget for each expense category\n\
    • **Emergency Fund**: Save 3-6 months of expenses\n\
    • **Automate Savings**: Set up automatic transfers";

const BUDGET_PHRASES: &[&str] = &[
    "budget tips",
    "budget advice",
    "save money",
    "financial advice",
    "money tips",
    "reduce expenses",
];

/// A labelled date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    /// First day (inclusive)
    pub from: NaiveDate,
    /// Last day (inclusive)
    pub to: NaiveDate,
    /// Human label ("this month", "in August 2026")
    pub label: String,
}

impl DateWindow {
    /// Record filter for this window
    #[must_use]
    pub fn filter(&self) -> RecordFilter {
        RecordFilter::between(self.from, self.to)
    }
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Date window named in a question, if any.
///
/// "this month" wins over "last month", which wins over month names. Month names
/// resolve to the current year.
#[must_use]
pub fn window_from_message(message: &str, today: NaiveDate) -> Option<DateWindow> {
    let lower = message.to_lowercase();

    if lower.contains("this month") {
        let (from, to) = month_bounds(today.year(), today.month())?;
        return Some(DateWindow {
            from,
            to,
            label: "this month".to_string(),
        });
    }

    if lower.contains("last month") || lower.contains("previous month") {
        let previous = today.checked_sub_months(Months::new(1))?;
        let (from, to) = month_bounds(previous.year(), previous.month())?;
        return Some(DateWindow {
            from,
            to,
            label: "last month".to_string(),
        });
    }

    let month = lower
        .split(|c: char| !c.is_alphanumeric())
        .find_map(month_from_name)?;
    let (from, to) = month_bounds(today.year(), month)?;
    Some(DateWindow {
        from,
        to,
        label: format!("in {}", from.format("%B %Y")),
    })
}

/// Whether a question asks for budgeting tips
#[must_use]
pub fn is_budget_question(message: &str) -> bool {
    let lower = message.to_lowercase();
    BUDGET_PHRASES.iter().any(|p| lower.contains(p))
}

/// Whether a question asks for the biggest category
#[must_use]
pub fn is_biggest_category_question(message: &str) -> bool {
    let lower = message.to_lowercase();
    (lower.contains("biggest") || lower.contains("highest") || lower.contains("top"))
        && lower.contains("category")
}

/// Totals over a set of records
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingSummary {
    /// Sum of all amounts
    pub total: f64,
    /// Number of records
    pub count: usize,
    /// Per-category totals, largest first
    pub by_category: Vec<(Category, f64)>,
}

impl SpendingSummary {
    /// Summarise records
    #[must_use]
    pub fn from_records(records: &[ExpenseRecord]) -> Self {
        let mut totals: HashMap<Category, f64> = HashMap::new();
        for record in records {
            *totals.entry(record.category).or_default() += record.amount;
        }

        let mut by_category: Vec<(Category, f64)> = totals.into_iter().collect();
        // Ties fall back to display order so output is stable
        by_category.sort_by(|a, b| {
            b.1.total_cmp(&a.1).then_with(|| {
                let pos = |c: &Category| Category::ALL.iter().position(|x| x == c);
                pos(&a.0).cmp(&pos(&b.0))
            })
        });

        Self {
            total: records.iter().map(|r| r.amount).sum(),
            count: records.len(),
            by_category,
        }
    }

    /// Largest category with its share of the total in percent
    #[must_use]
    pub fn biggest(&self) -> Option<(Category, f64, f64)> {
        let (category, amount) = *self.by_category.first()?;
        let share = if self.total > 0.0 {
            amount / self.total * 100.0
        } else {
            0.0
        };
        Some((category, amount, share))
    }

    /// "Food: $12.00, Bills: $40.00"
    #[must_use]
    pub fn breakdown_line(&self) -> String {
        self.by_category
            .iter()
            .map(|(category, amount)| format!("{}: ${:.2}", category, amount))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Plain summary used when the text generator is unavailable
    #[must_use]
    pub fn render(&self, label: &str) -> String {
        if self.count == 0 {
            return format!("📊 You don't have any expenses recorded {}.", label);
        }

        let mut out = format!(
            "📊 **Spending {}:**\n\n💰 **Total:** ${:.2} across {} expense{}\n",
            label,
            self.total,
            self.count,
            if self.count == 1 { "" } else { "s" }
        );
        for (category, amount) in &self.by_category {
            out.push_str(&format!("🏷️ {}: ${:.2}\n", category, amount));
        }
        out
    }
}

/// Prompt for open-ended analysis questions
#[must_use]
pub fn analysis_prompt(
    question: &str,
    summary: &SpendingSummary,
    window: Option<&DateWindow>,
    records: &[ExpenseRecord],
    today: NaiveDate,
) -> String {
    let details = records
        .iter()
        .map(|r| {
            format!(
                "- {} | {} | ${:.2} | {}",
                r.date.format("%b %-d, %Y"),
                r.text,
                r.amount,
                r.category
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Today's date is {}.\n\
         User question: \"{}\"\n\n\
         Total amount: ${:.2}\n\
         Category breakdown: {}\n\
         {}\
         Expense details:\n{}\n\n\
         Answer the question using only this data. Show every expense when listing.",
        today.format("%b %-d, %Y"),
        question,
        summary.total,
        summary.breakdown_line(),
        window
            .map(|w| format!("Time period: {}\n", w.label))
            .unwrap_or_default(),
        details
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(amount: f64, category: Category) -> ExpenseRecord {
        ExpenseRecord {
            id: "r".to_string(),
            user_id: "u1".to_string(),
            text: "x".to_string(),
            amount,
            category,
            date: ymd(2026, 8, 1),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_window_this_and_last_month() {
        let today = ymd(2026, 3, 15);

        let this = window_from_message("How much this month?", today).unwrap();
        assert_eq!((this.from, this.to), (ymd(2026, 3, 1), ymd(2026, 3, 31)));

        let last = window_from_message("total last month", today).unwrap();
        assert_eq!((last.from, last.to), (ymd(2026, 2, 1), ymd(2026, 2, 28)));
    }

    #[test]
    fn test_window_last_month_crosses_year() {
        let last = window_from_message("last month", ymd(2026, 1, 10)).unwrap();
        assert_eq!((last.from, last.to), (ymd(2025, 12, 1), ymd(2025, 12, 31)));
    }

    #[test]
    fn test_window_month_name_uses_whole_words() {
        let today = ymd(2026, 8, 15);
        let july = window_from_message("what did I spend in July?", today).unwrap();
        assert_eq!(july.label, "in July 2026");
        assert_eq!(july.to, ymd(2026, 7, 31));

        assert!(window_from_message("groceries at the market", today).is_none());
    }

    #[test]
    fn test_summary_and_biggest() {
        let summary = SpendingSummary::from_records(&[
            record(30.0, Category::Food),
            record(10.0, Category::Bills),
            record(20.0, Category::Food),
        ]);
        assert_eq!(summary.total, 60.0);
        assert_eq!(summary.count, 3);

        let (category, amount, share) = summary.biggest().unwrap();
        assert_eq!(category, Category::Food);
        assert_eq!(amount, 50.0);
        assert!((share - 83.33).abs() < 0.01);
        assert_eq!(summary.breakdown_line(), "Food: $50.00, Bills: $10.00");
    }

    #[test]
    fn test_empty_summary() {
        let summary = SpendingSummary::from_records(&[]);
        assert!(summary.biggest().is_none());
        assert!(summary.render("this month").contains("don't have any expenses"));
    }

    #[test]
    fn test_question_kinds() {
        assert!(is_budget_question("Any budget tips for me?"));
        assert!(is_biggest_category_question("What's my biggest spending category?"));
        assert!(!is_biggest_category_question("biggest purchase"));
    }
}
