//! Smart delete/edit: date-phrase lookup and confirmation handling

use crate::error::Result;
use crate::intent::is_cancel;
use crate::lookup::find_candidates;
use crate::session::{ExpenseRef, PendingConfirmation, PendingOperation, SessionKind};
use tracing::{debug, info, warn};

use super::core::DialogueEngine;
use super::helpers::{describe, is_all, is_no, is_yes, numbered, selection};
use super::listing::NO_EXPENSES;
use super::types::{Reply, TurnScope};

impl DialogueEngine {
    /// Find records matching a date phrase and set up the follow-up
    pub(crate) async fn smart_lookup(
        &self,
        scope: TurnScope<'_>,
        operation: PendingOperation,
        date_description: Option<String>,
    ) -> Result<Reply> {
        let Some(phrase) = date_description else {
            let example = match operation {
                PendingOperation::Delete => "delete the expense on August 1st",
                PendingOperation::Edit => "edit my expense from yesterday",
            };
            return Ok(Reply::text(format!(
                "🤔 I couldn't find a specific date in that. Try something like \"{}\".",
                example
            )));
        };

        // Matched against every record, not a pre-filtered range
        let records = self.all_records(scope).await?;
        if records.is_empty() {
            return Ok(Reply::text(NO_EXPENSES));
        }

        let candidates: Vec<ExpenseRef> = find_candidates(&records, &phrase, self.clock.today())
            .iter()
            .map(ExpenseRef::from)
            .collect();
        debug!(phrase = %phrase, matches = candidates.len(), "Smart lookup");

        if candidates.is_empty() {
            return Ok(Reply::text(format!(
                "🔍 No expenses found matching \"{}\". Say **show expenses** to see your recent ones.",
                phrase
            )));
        }

        if operation == PendingOperation::Edit && candidates.len() == 1 {
            return self.start_edit(scope, &candidates[0]).await;
        }

        let text = match (operation, candidates.len()) {
            (PendingOperation::Delete, 1) => format!(
                "🗑️ Delete this expense?\n{}\n\nReply **yes** to delete it or **no** to keep it.",
                describe(&candidates[0])
            ),
            (PendingOperation::Delete, n) => format!(
                "🗑️ I found {} expenses matching \"{}\":\n{}\n\nReply with a number to delete one, \
                 **all** to delete every one of them, or **no** to cancel.",
                n,
                phrase,
                numbered(&candidates)
            ),
            (PendingOperation::Edit, n) => format!(
                "✏️ I found {} expenses matching \"{}\":\n{}\n\nReply with the number of the one \
                 to edit, or **no** to cancel.",
                n,
                phrase,
                numbered(&candidates)
            ),
        };

        if let Some(pending) = PendingConfirmation::new(operation, candidates) {
            self.sessions
                .save(scope.user_id, scope.conversation_id, &pending)
                .await?;
        }
        Ok(Reply::text(text))
    }

    /// Resolve an open confirmation.
    ///
    /// `None` means the message was not an answer; the confirmation stays open
    /// and the message is routed normally.
    pub(crate) async fn resolve_pending(
        &self,
        scope: TurnScope<'_>,
        pending: &PendingConfirmation,
        message: &str,
    ) -> Result<Option<Reply>> {
        let count = pending.candidates().len();
        if count == 0 {
            self.clear_pending(scope).await?;
            return Ok(None);
        }

        if is_no(message) || is_cancel(message) {
            self.clear_pending(scope).await?;
            let text = match pending.operation {
                PendingOperation::Delete => "👍 Okay, nothing was deleted.",
                PendingOperation::Edit => "👍 Okay, edit cancelled.",
            };
            return Ok(Some(Reply::text(text)));
        }

        let out_of_range = || {
            Reply::text(format!(
                "Please reply with a number between 1 and {}{}, or **no** to cancel.",
                count,
                match pending.operation {
                    PendingOperation::Delete => ", **all**",
                    PendingOperation::Edit => "",
                }
            ))
        };

        let picked = if is_yes(message) {
            if count > 1 {
                return Ok(Some(out_of_range()));
            }
            pending.candidate(1)
        } else if let Some(index) = selection(message) {
            match pending.candidate(index) {
                Some(candidate) => Some(candidate),
                None => return Ok(Some(out_of_range())),
            }
        } else if is_all(message) && pending.operation == PendingOperation::Delete {
            return self.delete_all(scope, pending.candidates()).await.map(Some);
        } else {
            return Ok(None);
        };

        let Some(candidate) = picked else {
            return Ok(Some(out_of_range()));
        };

        match pending.operation {
            PendingOperation::Delete => {
                self.clear_pending(scope).await?;
                self.delete_expense(scope, candidate).await.map(Some)
            }
            PendingOperation::Edit => self.start_edit(scope, candidate).await.map(Some),
        }
    }

    async fn delete_all(&self, scope: TurnScope<'_>, candidates: &[ExpenseRef]) -> Result<Reply> {
        self.clear_pending(scope).await?;

        let mut deleted = 0usize;
        let mut failed = 0usize;
        for candidate in candidates {
            match self.records.delete(&candidate.id, scope.user_id).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    warn!(record_id = %candidate.id, error = %e, "Bulk delete entry failed");
                    failed += 1;
                }
            }
        }
        info!(user_id = %scope.user_id, deleted, failed, "Bulk delete finished");

        let mut text = format!(
            "🗑️ Deleted {} expense{}.",
            deleted,
            if deleted == 1 { "" } else { "s" }
        );
        if failed > 0 {
            text.push_str(&format!(" {} could not be deleted.", failed));
        }

        Ok(if deleted > 0 {
            Reply::changed(text)
        } else {
            Reply::text(text)
        })
    }

    pub(crate) async fn clear_pending(&self, scope: TurnScope<'_>) -> Result<()> {
        self.sessions
            .clear(
                scope.user_id,
                scope.conversation_id,
                SessionKind::PendingConfirmation,
            )
            .await
    }
}
