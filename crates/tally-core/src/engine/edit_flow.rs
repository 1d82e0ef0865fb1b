//! Edit-expense flow
//!
//! Two states: selecting a field (`field == None`) and awaiting its value.
//! Applying a value writes the record once and ends the flow.

use crate::category::Category;
use crate::error::Result;
use crate::intent::Intent;
use crate::parse::parse_amount;
use crate::records::ExpenseUpdate;
use crate::session::{EditExpenseSession, EditField, ExpenseRef, SessionKind};
use tracing::{info, warn};

use super::core::DialogueEngine;
use super::helpers::{describe, money, FIELD_PROMPT};
use super::types::{Reply, TurnScope};

fn value_prompt(session: &EditExpenseSession, field: EditField) -> String {
    match field {
        EditField::Description => format!(
            "📝 What should the new description be? (currently \"{}\")",
            session.original_text
        ),
        EditField::Amount => format!(
            "💰 What's the new amount? (currently {})",
            money(session.original_amount)
        ),
        EditField::Category => format!(
            "🏷️ Which category? {} (currently {})",
            Category::choices(),
            session.original_category
        ),
    }
}

impl DialogueEngine {
    /// Start editing a record, replacing any other flow in this conversation
    pub(crate) async fn start_edit(&self, scope: TurnScope<'_>, expense: &ExpenseRef) -> Result<Reply> {
        self.clear_add(scope).await?;
        self.sessions
            .clear(
                scope.user_id,
                scope.conversation_id,
                SessionKind::PendingConfirmation,
            )
            .await?;

        let session = EditExpenseSession::for_record(expense);
        self.sessions
            .save(scope.user_id, scope.conversation_id, &session)
            .await?;

        Ok(Reply::text(format!(
            "✏️ Editing:\n{}\n\n{}",
            describe(expense),
            FIELD_PROMPT
        )))
    }

    /// Messages an edit session consumes before the escape hatch is considered.
    ///
    /// Field names and "change X to Y" mention "category" and would otherwise
    /// abandon the flow.
    pub(crate) async fn edit_directive(
        &self,
        scope: TurnScope<'_>,
        session: &EditExpenseSession,
        message: &str,
        intent: &Intent,
    ) -> Result<Option<Reply>> {
        if let Intent::ChangeField { field, value } = intent {
            return self.apply_edit(scope, session, *field, value).await.map(Some);
        }

        if session.field.is_none() {
            if let Some(field) = EditField::from_name(message) {
                let mut session = session.clone();
                session.field = Some(field);
                self.sessions
                    .save(scope.user_id, scope.conversation_id, &session)
                    .await?;
                return Ok(Some(Reply::text(value_prompt(&session, field))));
            }
        }

        Ok(None)
    }

    /// Advance an edit session with a plain message
    pub(crate) async fn continue_edit(
        &self,
        scope: TurnScope<'_>,
        session: &EditExpenseSession,
        message: &str,
    ) -> Result<Reply> {
        match session.field {
            Some(field) => self.apply_edit(scope, session, field, message).await,
            None => Ok(Reply::text(format!(
                "Please choose **description**, **amount** or **category**, or type **cancel**.\n\n{}",
                FIELD_PROMPT
            ))),
        }
    }

    /// Validate a new value and update the record, keeping the other fields
    async fn apply_edit(
        &self,
        scope: TurnScope<'_>,
        session: &EditExpenseSession,
        field: EditField,
        value: &str,
    ) -> Result<Reply> {
        let mut update = ExpenseUpdate {
            text: session.original_text.clone(),
            amount: session.original_amount,
            category: session.original_category,
            date: session.original_date,
        };

        match field {
            EditField::Amount => match parse_amount(value).filter(|a| a.is_finite() && *a > 0.0) {
                Some(amount) => update.amount = amount,
                None => {
                    return Ok(Reply::text(
                        "❌ Please enter a valid amount greater than zero, for example **12.50**.",
                    ))
                }
            },
            EditField::Category => {
                update.category = Category::from_name(value)
                    .or_else(|| Category::detect(value))
                    .unwrap_or(Category::Other);
            }
            EditField::Description => {
                let text = value.trim();
                if text.chars().count() < 2 {
                    return Ok(Reply::text(
                        "❌ Please give a description of at least 2 characters.",
                    ));
                }
                update.text = text.to_string();
            }
        }

        self.sessions
            .clear(scope.user_id, scope.conversation_id, SessionKind::EditExpense)
            .await?;

        match self
            .records
            .update(&session.expense_id, scope.user_id, update)
            .await
        {
            Ok(record) => {
                info!(
                    user_id = %scope.user_id,
                    record_id = %record.id,
                    field = %field,
                    "Expense updated"
                );
                Ok(Reply::changed(format!(
                    "✅ Updated the {}:\n{}",
                    field,
                    describe(&ExpenseRef::from(&record))
                )))
            }
            Err(e) => {
                warn!(user_id = %scope.user_id, error = %e, "Expense update failed");
                Ok(Reply::text(format!("❌ I couldn't update that expense ({}).", e)))
            }
        }
    }
}
