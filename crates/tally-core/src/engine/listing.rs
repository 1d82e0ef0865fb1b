//! Recent-expense listing and numbered commands

use crate::error::Result;
use crate::records::{ExpenseRecord, RecordFilter};
use crate::session::ExpenseRef;
use tracing::{info, warn};

use super::core::DialogueEngine;
use super::helpers::{describe, numbered};
use super::types::{Reply, TurnScope};

pub(crate) const NO_EXPENSES: &str =
    "📭 You don't have any expenses recorded yet. Say **add expense** to log one.";

/// Which hint a listing ends with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListMode {
    Show,
    Modify,
}

impl DialogueEngine {
    /// All of the user's records, newest first
    pub(crate) async fn all_records(&self, scope: TurnScope<'_>) -> Result<Vec<ExpenseRecord>> {
        Ok(self
            .records
            .find_many(scope.user_id, &RecordFilter::all())
            .await?)
    }

    pub(crate) async fn list_recent(&self, scope: TurnScope<'_>, mode: ListMode) -> Result<Reply> {
        let records = self.all_records(scope).await?;
        if records.is_empty() {
            return Ok(Reply::text(NO_EXPENSES));
        }

        let shown: Vec<ExpenseRef> = records
            .iter()
            .take(self.config.recent_limit)
            .map(ExpenseRef::from)
            .collect();

        let header = match mode {
            ListMode::Show => "📊 **Your recent expenses:**",
            ListMode::Modify => "✏️ **Which expense would you like to change?**",
        };
        let mut text = format!("{}\n\n{}", header, numbered(&shown));

        if records.len() > shown.len() {
            text.push_str(&format!("\n... and {} more", records.len() - shown.len()));
        }

        text.push_str(match mode {
            ListMode::Show => "\n\n💡 Ask \"how much did I spend this month?\" for a breakdown.",
            ListMode::Modify => {
                "\n\nReply **edit 1** to change an expense or **delete 1** to remove it."
            }
        });
        Ok(Reply::text(text))
    }

    /// Resolve a 1-based index against the recent listing
    async fn listed_expense(
        &self,
        scope: TurnScope<'_>,
        index: usize,
    ) -> Result<std::result::Result<ExpenseRef, Reply>> {
        let records = self.all_records(scope).await?;
        if records.is_empty() {
            return Ok(Err(Reply::text(NO_EXPENSES)));
        }

        let listed = records.len().min(self.config.recent_limit);
        match index.checked_sub(1).filter(|i| *i < listed) {
            Some(i) => Ok(Ok(ExpenseRef::from(&records[i]))),
            None => Ok(Err(Reply::text(format!(
                "❌ Please choose a number between 1 and {}. Say **show expenses** to see the list.",
                listed
            )))),
        }
    }

    pub(crate) async fn edit_by_index(&self, scope: TurnScope<'_>, index: usize) -> Result<Reply> {
        match self.listed_expense(scope, index).await? {
            Ok(expense) => self.start_edit(scope, &expense).await,
            Err(reply) => Ok(reply),
        }
    }

    /// Numbered delete is explicit and takes effect immediately
    pub(crate) async fn delete_by_index(&self, scope: TurnScope<'_>, index: usize) -> Result<Reply> {
        match self.listed_expense(scope, index).await? {
            Ok(expense) => self.delete_expense(scope, &expense).await,
            Err(reply) => Ok(reply),
        }
    }

    /// Delete one record and report the outcome
    pub(crate) async fn delete_expense(
        &self,
        scope: TurnScope<'_>,
        expense: &ExpenseRef,
    ) -> Result<Reply> {
        match self.records.delete(&expense.id, scope.user_id).await {
            Ok(()) => {
                info!(user_id = %scope.user_id, record_id = %expense.id, "Expense deleted");
                Ok(Reply::changed(format!("🗑️ Deleted:\n{}", describe(expense))))
            }
            Err(e) => {
                warn!(user_id = %scope.user_id, error = %e, "Expense delete failed");
                Ok(Reply::text(format!("❌ I couldn't delete that expense ({}).", e)))
            }
        }
    }
}
