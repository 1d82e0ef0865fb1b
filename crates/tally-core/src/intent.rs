//! Intent Classifier
//!
//! Maps one free-text message to an [`Intent`] with its extracted slots.
//! Pure and synchronous: no I/O, the same text always yields the same result.
//!
//! # Rule order
//!
//! Rules are evaluated top to bottom and the first match wins. Specific numeric
//! and field patterns come before broad keyword lists, so "delete 3" is never read
//! as a generic modify request and "show me my biggest category" is never read as
//! a listing request.

use crate::lookup::extract_date_phrase;
use crate::parse::parse_natural_expense;
use crate::session::EditField;
use regex::Regex;
use std::sync::LazyLock;

/// Classified user intent with its slots
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Start the add-flow, possibly with slots already known
    AddExpense {
        /// Parsed amount
        amount: Option<f64>,
        /// Parsed description
        description: Option<String>,
    },
    /// "edit 2": edit the n-th listed expense
    EditExpenseByIndex {
        /// 1-based index into the recent list
        index: usize,
    },
    /// "change amount to 12.50"
    ChangeField {
        /// Field to change
        field: EditField,
        /// Raw new value
        value: String,
    },
    /// "delete 3": delete the n-th listed expense
    DeleteExpenseByIndex {
        /// 1-based index into the recent list
        index: usize,
    },
    /// "delete the expense on August 1st"
    SmartDelete {
        /// Date phrase, if one could be isolated
        date_description: Option<String>,
    },
    /// "edit my expense from yesterday"
    SmartEdit {
        /// Date phrase, if one could be isolated
        date_description: Option<String>,
    },
    /// List recent expenses
    ShowExpenses,
    /// Bare delete/edit request: list expenses with edit/delete hints
    ModifyExpenses,
    /// Questions about spending
    AnalyzeExpenses,
    /// Budgeting advice
    GeneralAdvice,
}

/// Classifier output
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Intent and slots
    pub intent: Intent,
    /// Rule confidence in `[0, 1]`
    pub confidence: f32,
    /// Name of the rule that matched
    pub rule: &'static str,
}

/// Confidence of the fall-through rule
pub const DEFAULT_CONFIDENCE: f32 = 0.3;

type Matcher = fn(original: &str, lower: &str) -> Option<Intent>;

struct Rule {
    name: &'static str,
    confidence: f32,
    matcher: Matcher,
}

static RULES: [Rule; 11] = [
    Rule {
        name: "natural_expense",
        confidence: 0.95,
        matcher: match_natural_expense,
    },
    Rule {
        name: "edit_by_index",
        confidence: 0.95,
        matcher: match_edit_by_index,
    },
    Rule {
        name: "change_field",
        confidence: 0.9,
        matcher: match_change_field,
    },
    Rule {
        name: "delete_by_index",
        confidence: 0.95,
        matcher: match_delete_by_index,
    },
    Rule {
        name: "smart_delete",
        confidence: 0.95,
        matcher: match_smart_delete,
    },
    Rule {
        name: "smart_edit",
        confidence: 0.95,
        matcher: match_smart_edit,
    },
    Rule {
        name: "show_expenses",
        confidence: 0.9,
        matcher: match_show_expenses,
    },
    Rule {
        name: "analyze_expenses",
        confidence: 0.9,
        matcher: match_analysis,
    },
    Rule {
        name: "modify_expenses",
        confidence: 0.8,
        matcher: match_modify,
    },
    Rule {
        name: "add_trigger",
        confidence: 0.9,
        matcher: match_add_trigger,
    },
    Rule {
        name: "general_advice",
        confidence: 0.7,
        matcher: match_advice,
    },
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("intent patterns are compile-time constants"))
        .collect()
}

static NATURAL_EXPENSE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bi\s+spent\s+\$?\d+",
        r"\bi\s+paid\s+\$?\d+",
        r"\bbought\s+.+\s+for\s+\$?\d+",
        r"\bspent\s+\$?\d+\s+on",
        r"\bpaid\s+\$?\d+\s+for",
        r"\$\d+\s+for\s+\w+",
        r"\$\d+\s+on\s+\w+",
    ])
});

static EDIT_BY_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:edit|modify)\s+(?:expense\s+)?#?(\d+)\b")
        .expect("EDIT_BY_INDEX is a compile-time constant")
});

static CHANGE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:change|update|set)\s+(?:the\s+)?(description|amount|category)\s+to\s+(.+)")
        .expect("CHANGE_FIELD is a compile-time constant")
});

static DELETE_BY_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:delete|remove)\s+(?:expense\s+)?#?(\d+)\b")
        .expect("DELETE_BY_INDEX is a compile-time constant")
});

static SMART_DELETE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:delete|remove)\b.*\bexpenses?\b.*\b(?:on|from)\s+\w+",
        r"\b(?:delete|remove)\b.*\bspent\b.*\b(?:on|from)\s+\w+",
        r"\b(?:delete|remove)\b.*\b(?:today|yesterday|\d+(?:st|nd|rd|th))\b",
    ])
});

static SMART_EDIT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\b(?:edit|modify|change|update)\b.*\bexpenses?\b.*\b(?:on|from)\s+\w+",
        r"\b(?:edit|modify|change|update)\b.*\bspent\b.*\b(?:on|from)\s+\w+",
        r"\b(?:edit|modify|change|update)\b.*\b(?:today|yesterday|\d+(?:st|nd|rd|th))\b",
    ])
});

static MODIFY_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:delete|remove|edit|change|update|modify)\b")
        .expect("MODIFY_WORDS is a compile-time constant")
});

const SHOW_PHRASES: &[&str] = &[
    "show me my recent",
    "show me my expenses",
    "show expenses",
    "list my",
    "recent expenses",
    "my expenses",
    "expense list",
    "view expenses",
    "see my expenses",
    "show recent",
    "list expenses",
];

const ANALYSIS_PHRASES: &[&str] = &[
    "how much did i spend",
    "how much have i spent",
    "what did i spend",
    "analyze",
    "total",
    "biggest",
    "highest",
    "category breakdown",
    "spending category",
    "expense analysis",
    "what's my biggest",
    "which category",
    "spending patterns",
    "breakdown",
];

const ADD_TRIGGERS: &[&str] = &[
    "add expense",
    "create expense",
    "new expense",
    "record expense",
    "log expense",
    "enter expense",
    "add new",
    "can you add",
];

const ADVICE_PHRASES: &[&str] = &[
    "how to save",
    "budget tips",
    "financial advice",
    "money saving",
    "reduce expenses",
    "cut costs",
];

/// Words that pull a user out of an active add/edit flow
const INTERRUPT_PHRASES: &[&str] = &[
    "biggest",
    "category",
    "how much",
    "show me",
    "analyze",
    "budget tips",
    "advice",
    "help",
];

/// Classify one message
#[must_use]
pub fn classify(message: &str) -> Classification {
    let original = message.trim();
    // ASCII lowercasing keeps byte offsets aligned with `original`
    let lower = original.to_ascii_lowercase();

    RULES
        .iter()
        .find_map(|rule| {
            (rule.matcher)(original, &lower).map(|intent| Classification {
                intent,
                confidence: rule.confidence,
                rule: rule.name,
            })
        })
        .unwrap_or(Classification {
            intent: Intent::AnalyzeExpenses,
            confidence: DEFAULT_CONFIDENCE,
            rule: "default",
        })
}

fn match_natural_expense(original: &str, lower: &str) -> Option<Intent> {
    if !NATURAL_EXPENSE.iter().any(|re| re.is_match(lower)) {
        return None;
    }
    let parsed = parse_natural_expense(original);
    Some(Intent::AddExpense {
        amount: parsed.as_ref().map(|p| p.amount),
        description: parsed.map(|p| p.description),
    })
}

fn match_edit_by_index(_original: &str, lower: &str) -> Option<Intent> {
    let index = EDIT_BY_INDEX.captures(lower)?[1].parse().ok()?;
    Some(Intent::EditExpenseByIndex { index })
}

fn match_change_field(original: &str, _lower: &str) -> Option<Intent> {
    let caps = CHANGE_FIELD.captures(original)?;
    let field = EditField::from_name(&caps[1])?;
    let value = caps[2].trim().to_string();
    (!value.is_empty()).then_some(Intent::ChangeField { field, value })
}

fn match_delete_by_index(_original: &str, lower: &str) -> Option<Intent> {
    let index = DELETE_BY_INDEX.captures(lower)?[1].parse().ok()?;
    Some(Intent::DeleteExpenseByIndex { index })
}

fn match_smart_delete(original: &str, lower: &str) -> Option<Intent> {
    SMART_DELETE
        .iter()
        .any(|re| re.is_match(lower))
        .then(|| Intent::SmartDelete {
            date_description: extract_date_phrase(original),
        })
}

fn match_smart_edit(original: &str, lower: &str) -> Option<Intent> {
    SMART_EDIT
        .iter()
        .any(|re| re.is_match(lower))
        .then(|| Intent::SmartEdit {
            date_description: extract_date_phrase(original),
        })
}

fn match_show_expenses(_original: &str, lower: &str) -> Option<Intent> {
    let listing = SHOW_PHRASES.iter().any(|p| lower.contains(p));
    let analytical = ANALYSIS_PHRASES.iter().any(|p| lower.contains(p));
    (listing && !analytical).then_some(Intent::ShowExpenses)
}

fn match_analysis(_original: &str, lower: &str) -> Option<Intent> {
    ANALYSIS_PHRASES
        .iter()
        .any(|p| lower.contains(p))
        .then_some(Intent::AnalyzeExpenses)
}

fn match_modify(_original: &str, lower: &str) -> Option<Intent> {
    MODIFY_WORDS.is_match(lower).then_some(Intent::ModifyExpenses)
}

fn match_add_trigger(original: &str, lower: &str) -> Option<Intent> {
    let (trigger, start) = ADD_TRIGGERS
        .iter()
        .find_map(|t| lower.find(t).map(|start| (*t, start)))?;

    // Only "<verb> expense ..." triggers carry a description tail
    let description = trigger
        .ends_with("expense")
        .then(|| trailing_description(&original[start + trigger.len()..]))
        .flatten();

    Some(Intent::AddExpense {
        amount: None,
        description,
    })
}

/// "for coffee", ": taxi", "- lunch" after an add trigger
fn trailing_description(tail: &str) -> Option<String> {
    // "add expenses: ..." keeps the plural out of the description
    let tail = match tail.strip_prefix('s') {
        Some(rest) if !rest.starts_with(char::is_alphanumeric) => rest,
        _ => tail,
    };
    let tail = tail.trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace());
    let tail = ["for ", "of ", "called "]
        .iter()
        .find_map(|prefix| {
            tail.get(..prefix.len())
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &tail[prefix.len()..])
        })
        .unwrap_or(tail);
    let description = tail.trim().trim_end_matches(['.', '!', '?']).trim();

    (description.chars().count() >= 2).then(|| description.to_string())
}

fn match_advice(_original: &str, lower: &str) -> Option<Intent> {
    ADVICE_PHRASES
        .iter()
        .any(|p| lower.contains(p))
        .then_some(Intent::GeneralAdvice)
}

/// Whether a message should abandon an active add/edit flow and be routed afresh.
///
/// A plain substring heuristic: descriptions that happen to contain one of the
/// words (for example "category-5 storm kit") also trigger it.
#[must_use]
pub fn interrupts_guided_flow(message: &str, intent: &Intent) -> bool {
    let lower = message.to_lowercase();
    matches!(intent, Intent::GeneralAdvice) || INTERRUPT_PHRASES.iter().any(|p| lower.contains(p))
}

/// Whether the message contains the token "cancel" or "stop"
#[must_use]
pub fn is_cancel(message: &str) -> bool {
    message
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case("cancel") || word.eq_ignore_ascii_case("stop"))
}

#[cfg(test)]
mod tests;
