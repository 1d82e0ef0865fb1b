//! Expense categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed set of expense categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Groceries, restaurants, coffee
    Food,
    /// Fuel, transit, taxis
    Transportation,
    /// Retail purchases
    Shopping,
    /// Movies, games, events
    Entertainment,
    /// Utilities, rent, subscriptions
    Bills,
    /// Medical and pharmacy
    Healthcare,
    /// Anything else
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transportation,
        Category::Shopping,
        Category::Entertainment,
        Category::Bills,
        Category::Healthcare,
        Category::Other,
    ];

    /// Canonical name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills",
            Category::Healthcare => "Healthcare",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive exact name match
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }

    /// First category whose name occurs anywhere in `text` (case-insensitive)
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| lower.contains(&c.as_str().to_lowercase()))
    }

    /// Comma-separated list for prompts
    #[must_use]
    pub fn choices() -> String {
        Self::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    /// Unknown names map to [`Category::Other`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s).unwrap_or(Category::Other))
    }
}

/// A reply to the "which category?" prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryReply {
    /// "yes"/"y": keep the suggestion
    AcceptSuggested,
    /// A concrete category (unrecognised input becomes `Other`)
    Chosen(Category),
}

/// Interpret a category-step reply
#[must_use]
pub fn parse_category_reply(input: &str) -> CategoryReply {
    if let Some(category) = Category::detect(input) {
        return CategoryReply::Chosen(category);
    }

    match input.trim().to_lowercase().as_str() {
        "yes" | "y" => CategoryReply::AcceptSuggested,
        _ => CategoryReply::Chosen(Category::Other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(Category::from_name("fOoD"), Some(Category::Food));
        assert_eq!(Category::from_name(" bills "), Some(Category::Bills));
        assert_eq!(Category::from_name("groceries"), None);
    }

    #[test]
    fn test_unknown_name_parses_to_other() {
        assert_eq!("Gadgets".parse::<Category>().unwrap(), Category::Other);
        assert_eq!("Healthcare".parse::<Category>().unwrap(), Category::Healthcare);
    }

    #[test]
    fn test_category_reply() {
        assert_eq!(parse_category_reply("yes"), CategoryReply::AcceptSuggested);
        assert_eq!(parse_category_reply("Y"), CategoryReply::AcceptSuggested);
        assert_eq!(
            parse_category_reply("make it Shopping"),
            CategoryReply::Chosen(Category::Shopping)
        );
        assert_eq!(
            parse_category_reply("whatever"),
            CategoryReply::Chosen(Category::Other)
        );
    }
}
