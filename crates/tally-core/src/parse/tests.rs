use super::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 15).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_parse_amount_plain_and_currency() {
    assert_eq!(parse_amount("5"), Some(5.0));
    assert_eq!(parse_amount("$5.50"), Some(5.5));
    assert_eq!(parse_amount("15.99 dollars"), Some(15.99));
    assert_eq!(parse_amount("$1,234.50"), Some(1234.5));
}

#[test]
fn test_parse_amount_rejects_text() {
    assert_eq!(parse_amount("abc"), None);
    assert_eq!(parse_amount("fifteen dollars"), None);
    assert_eq!(parse_amount("."), None);
    assert_eq!(parse_amount(""), None);
}

#[test]
fn test_parse_amount_takes_longest_numeric_prefix() {
    assert_eq!(parse_amount("5.5.5"), Some(5.5));
    assert_eq!(parse_amount("0"), Some(0.0));
}

#[test]
fn test_natural_expense_spent_on() {
    let parsed = parse_natural_expense("I spent $12.50 on groceries").unwrap();
    assert_eq!(parsed.amount, 12.5);
    assert_eq!(parsed.description, "groceries");
}

#[test]
fn test_natural_expense_bought_for_is_reversed() {
    let parsed = parse_natural_expense("I bought a new lamp for $40").unwrap();
    assert_eq!(parsed.amount, 40.0);
    assert_eq!(parsed.description, "a new lamp");
}

#[test]
fn test_natural_expense_variants() {
    let paid = parse_natural_expense("paid 30 for the electricity bill.").unwrap();
    assert_eq!(paid.amount, 30.0);
    assert_eq!(paid.description, "the electricity bill");

    let bare = parse_natural_expense("$8 on lunch").unwrap();
    assert_eq!(bare.amount, 8.0);
    assert_eq!(bare.description, "lunch");

    let thousands = parse_natural_expense("spent $1,200 on rent").unwrap();
    assert_eq!(thousands.amount, 1200.0);
}

#[test]
fn test_natural_expense_requires_both_slots() {
    assert!(parse_natural_expense("Coffee").is_none());
    assert!(parse_natural_expense("I paid the bill").is_none());
    assert!(parse_natural_expense("spent $0 on nothing").is_none());
    assert!(parse_natural_expense("$5 on x").is_none());
}

#[test]
fn test_parse_date_relative() {
    assert_eq!(parse_date("today", today()), today());
    assert_eq!(parse_date("Yesterday", today()), ymd(2026, 8, 14));
}

#[test]
fn test_parse_date_ordinal_month() {
    assert_eq!(parse_date("1st August", today()), ymd(2026, 8, 1));
    assert_eq!(parse_date("the 22nd of june", today()), ymd(2026, 6, 22));
}

#[test]
fn test_parse_date_numeric_formats() {
    assert_eq!(parse_date("2024-01-15", today()), ymd(2024, 1, 15));
    assert_eq!(parse_date("01/15/2024", today()), ymd(2024, 1, 15));
    assert_eq!(parse_date("1-15-2024", today()), ymd(2024, 1, 15));
}

#[test]
fn test_parse_date_natural_text() {
    assert_eq!(parse_date("July 4, 2025", today()), ymd(2025, 7, 4));
    assert_eq!(parse_date("4th July, 2025", today()), ymd(2025, 7, 4));
    assert_eq!(parse_date("aug 3", today()), ymd(2026, 8, 3));
}

#[test]
fn test_parse_date_defaults_to_today() {
    assert_eq!(parse_date("sometime last week", today()), today());
    assert_eq!(parse_date("31st february", today()), today());
    assert_eq!(parse_date("2024-13-45", today()), today());
}

#[test]
fn test_month_from_name() {
    assert_eq!(month_from_name("Sept"), Some(9));
    assert_eq!(month_from_name("DECEMBER"), Some(12));
    assert_eq!(month_from_name("market"), None);
}
