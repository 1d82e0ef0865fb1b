use super::*;

fn intent(message: &str) -> Intent {
    classify(message).intent
}

#[test]
fn test_natural_expense_carries_slots() {
    let classification = classify("I spent $12.50 on groceries");
    assert_eq!(classification.confidence, 0.95);
    assert_eq!(
        classification.intent,
        Intent::AddExpense {
            amount: Some(12.5),
            description: Some("groceries".to_string()),
        }
    );

    assert_eq!(
        intent("bought a kettle for $25"),
        Intent::AddExpense {
            amount: Some(25.0),
            description: Some("a kettle".to_string()),
        }
    );
}

#[test]
fn test_numbered_commands() {
    assert_eq!(intent("edit 2"), Intent::EditExpenseByIndex { index: 2 });
    assert_eq!(intent("Modify #1"), Intent::EditExpenseByIndex { index: 1 });
    assert_eq!(intent("delete 3"), Intent::DeleteExpenseByIndex { index: 3 });
    assert_eq!(
        intent("remove expense 4"),
        Intent::DeleteExpenseByIndex { index: 4 }
    );
}

#[test]
fn test_change_field_keeps_value_case() {
    assert_eq!(
        intent("change amount to 12.50"),
        Intent::ChangeField {
            field: EditField::Amount,
            value: "12.50".to_string(),
        }
    );
    assert_eq!(
        intent("Change description to Flat White"),
        Intent::ChangeField {
            field: EditField::Description,
            value: "Flat White".to_string(),
        }
    );
}

#[test]
fn test_ordinal_dates_are_not_indices() {
    assert_eq!(
        intent("delete the expense on August 1st"),
        Intent::SmartDelete {
            date_description: Some("August 1st".to_string()),
        }
    );
    assert!(matches!(
        intent("delete 3rd august"),
        Intent::SmartDelete { .. }
    ));
}

#[test]
fn test_smart_edit() {
    assert_eq!(
        intent("edit my expense from yesterday"),
        Intent::SmartEdit {
            date_description: Some("yesterday".to_string()),
        }
    );
}

#[test]
fn test_show_does_not_shadow_analysis() {
    assert_eq!(intent("show me my expenses"), Intent::ShowExpenses);
    assert_eq!(intent("show me my biggest category"), Intent::AnalyzeExpenses);
    assert_eq!(
        intent("list my expenses with the category breakdown"),
        Intent::AnalyzeExpenses
    );
}

#[test]
fn test_bare_modify_request() {
    let classification = classify("I want to delete something");
    assert_eq!(classification.intent, Intent::ModifyExpenses);
    assert_eq!(classification.confidence, 0.8);
}

#[test]
fn test_add_trigger() {
    let classification = classify("add expense");
    assert_eq!(classification.confidence, 0.9);
    assert_eq!(
        classification.intent,
        Intent::AddExpense {
            amount: None,
            description: None,
        }
    );

    assert_eq!(
        intent("add expense for Coffee beans"),
        Intent::AddExpense {
            amount: None,
            description: Some("Coffee beans".to_string()),
        }
    );
    assert_eq!(
        intent("log expenses: taxi"),
        Intent::AddExpense {
            amount: None,
            description: Some("taxi".to_string()),
        }
    );
    assert_eq!(
        intent("add expense salad"),
        Intent::AddExpense {
            amount: None,
            description: Some("salad".to_string()),
        }
    );
    assert_eq!(
        intent("can you add an expense"),
        Intent::AddExpense {
            amount: None,
            description: None,
        }
    );
}

#[test]
fn test_advice_and_default() {
    assert_eq!(intent("any budget tips?"), Intent::GeneralAdvice);

    let fallback = classify("hello there");
    assert_eq!(fallback.intent, Intent::AnalyzeExpenses);
    assert_eq!(fallback.confidence, DEFAULT_CONFIDENCE);
    assert_eq!(fallback.rule, "default");
}

#[test]
fn test_classification_is_deterministic() {
    for message in ["add expense", "delete 2", "how much did I spend?", "Coffee"] {
        assert_eq!(classify(message), classify(message));
    }
}

#[test]
fn test_interrupts_guided_flow() {
    assert!(interrupts_guided_flow(
        "what's my biggest category?",
        &Intent::AnalyzeExpenses
    ));
    assert!(interrupts_guided_flow("Help", &Intent::AnalyzeExpenses));
    assert!(interrupts_guided_flow("money saving ideas", &Intent::GeneralAdvice));
    assert!(!interrupts_guided_flow("Coffee", &Intent::AnalyzeExpenses));
    assert!(!interrupts_guided_flow("12.50", &Intent::AnalyzeExpenses));
}

#[test]
fn test_is_cancel_matches_tokens() {
    assert!(is_cancel("cancel"));
    assert!(is_cancel("please STOP."));
    assert!(!is_cancel("stopwatch"));
    assert!(!is_cancel("cancellation fee"));
}
