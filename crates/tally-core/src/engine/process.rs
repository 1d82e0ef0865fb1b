//! Turn processing
//!
//! Contains `handle_turn` and the routing precedence between open sessions
//! and the freshly classified intent.

use crate::error::{format_error_for_chat, Result};
use crate::intent::{classify, interrupts_guided_flow, is_cancel, Intent};
use crate::session::{
    AddExpenseSession, EditExpenseSession, PendingConfirmation, PendingOperation, SessionKey,
    SessionKind,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::config::{TurnRequest, TurnResponse};
use super::core::DialogueEngine;
use super::listing::ListMode;
use super::types::{Reply, TurnScope};

const EMPTY_MESSAGE: &str =
    "🤔 I didn't catch that. Try **add expense**, **show expenses** or ask about your spending.";

impl DialogueEngine {
    /// Handle one message. Never fails: errors become the response text.
    #[tracing::instrument(skip(self, request), fields(user = %request.user_id))]
    pub async fn handle_turn(&self, request: TurnRequest) -> TurnResponse {
        let conversation_id = request.conversation_id().to_string();
        let scope = TurnScope {
            user_id: &request.user_id,
            conversation_id: &conversation_id,
        };
        let message = request.message.trim();

        let lock_key = SessionKey::history(scope.user_id, scope.conversation_id)
            .as_str()
            .to_string();
        let lock = self
            .turn_locks
            .entry(lock_key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let reply = {
            let _guard = lock.lock().await;
            if message.is_empty() {
                Reply::text(EMPTY_MESSAGE)
            } else {
                let reply = match self.route(scope, message).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        error!(error = %e, "Turn failed");
                        Reply::text(format_error_for_chat(&e))
                    }
                };

                // The log is load-append-save, so it stays under the turn lock
                if let Err(e) = self
                    .history
                    .append(scope.user_id, scope.conversation_id, message, &reply.text)
                    .await
                {
                    warn!(error = %e, "Failed to append conversation history");
                }
                reply
            }
        };

        drop(lock);
        self.turn_locks
            .remove_if(&lock_key, |_, lock| Arc::strong_count(lock) == 1);

        TurnResponse {
            response_text: reply.text,
            record_changed: reply.record_changed,
            conversation_id,
        }
    }

    /// Pending confirmation, then an open add/edit flow, then the fresh intent
    async fn route(&self, scope: TurnScope<'_>, message: &str) -> Result<Reply> {
        let classification = classify(message);
        debug!(
            rule = classification.rule,
            confidence = classification.confidence,
            intent = ?classification.intent,
            "Message classified"
        );
        let intent = classification.intent;

        if let Some(pending) = self
            .sessions
            .load::<PendingConfirmation>(scope.user_id, scope.conversation_id)
            .await?
        {
            if let Some(reply) = self.resolve_pending(scope, &pending, message).await? {
                return Ok(reply);
            }
        }

        if let Some(session) = self
            .sessions
            .load::<AddExpenseSession>(scope.user_id, scope.conversation_id)
            .await?
        {
            if is_cancel(message) {
                self.clear_add(scope).await?;
                return Ok(Reply::text("❌ Expense entry cancelled."));
            }
            if !interrupts_guided_flow(message, &intent) {
                return self.continue_add(scope, session, message).await;
            }
            info!(step = ?session.step, "Leaving add flow for a new request");
            self.clear_add(scope).await?;
        }

        if let Some(session) = self
            .sessions
            .load::<EditExpenseSession>(scope.user_id, scope.conversation_id)
            .await?
        {
            if is_cancel(message) {
                self.clear_edit(scope).await?;
                return Ok(Reply::text("❌ Edit cancelled."));
            }
            if let Some(reply) = self.edit_directive(scope, &session, message, &intent).await? {
                return Ok(reply);
            }
            if interrupts_guided_flow(message, &intent) {
                info!(expense_id = %session.expense_id, "Leaving edit flow for a new request");
                self.clear_edit(scope).await?;
            } else if !starts_new_flow(&intent) {
                return self.continue_edit(scope, &session, message).await;
            }
        }

        self.dispatch(scope, message, intent).await
    }

    async fn dispatch(&self, scope: TurnScope<'_>, message: &str, intent: Intent) -> Result<Reply> {
        match intent {
            Intent::AddExpense {
                amount,
                description,
            } => self.start_add(scope, amount, description).await,
            Intent::EditExpenseByIndex { index } => self.edit_by_index(scope, index).await,
            Intent::DeleteExpenseByIndex { index } => self.delete_by_index(scope, index).await,
            Intent::ChangeField { .. } => Ok(Reply::text(
                "No expense is currently being edited. Say **edit 1** (or \"edit my expense from \
                 yesterday\") first.",
            )),
            Intent::SmartDelete { date_description } => {
                self.smart_lookup(scope, PendingOperation::Delete, date_description)
                    .await
            }
            Intent::SmartEdit { date_description } => {
                self.smart_lookup(scope, PendingOperation::Edit, date_description)
                    .await
            }
            Intent::ShowExpenses => self.list_recent(scope, ListMode::Show).await,
            Intent::ModifyExpenses => self.list_recent(scope, ListMode::Modify).await,
            Intent::AnalyzeExpenses => self.analyze(scope, message).await,
            Intent::GeneralAdvice => self.advise(scope, message).await,
        }
    }

    async fn clear_edit(&self, scope: TurnScope<'_>) -> Result<()> {
        self.sessions
            .clear(scope.user_id, scope.conversation_id, SessionKind::EditExpense)
            .await
    }
}

/// Requests that replace an open edit session instead of feeding it a value
fn starts_new_flow(intent: &Intent) -> bool {
    matches!(
        intent,
        Intent::EditExpenseByIndex { .. }
            | Intent::DeleteExpenseByIndex { .. }
            | Intent::SmartEdit { .. }
            | Intent::SmartDelete { .. }
            | Intent::ShowExpenses
    )
}
