//! Guided add-expense flow
//!
//! `Description → Amount → Category → Date → Confirmation`. Only the
//! confirmation step writes to the record store.

use crate::category::{parse_category_reply, Category, CategoryReply};
use crate::error::Result;
use crate::parse::{parse_amount, parse_date, parse_natural_expense};
use crate::records::NewExpense;
use crate::session::{AddExpenseSession, AddStep, SessionKind};
use tracing::{info, warn};

use super::core::DialogueEngine;
use super::helpers::{is_commit, is_no, long_date, money};
use super::types::{Reply, TurnScope};

const DESCRIPTION_PROMPT: &str = "📝 What did you spend money on?";

const DATE_PROMPT: &str =
    "📅 When was this? (today, yesterday, 1st August, 2026-08-01 or 08/01/2026)";

const INVALID_AMOUNT: &str =
    "❌ Please enter a valid amount greater than zero, for example **12.50**.";

fn amount_prompt(description: &str) -> String {
    format!("💰 How much did you spend on **{}**?", description)
}

fn category_prompt(description: &str, amount: f64, suggested: Category) -> String {
    format!(
        "📝 **{}** for {}\n\n🏷️ I'd file this under **{}**. Reply **yes** to accept, \
         or name another category ({}).",
        description,
        money(amount),
        suggested,
        Category::choices()
    )
}

impl DialogueEngine {
    /// Start an add-flow at the first step the known slots allow
    pub(crate) async fn start_add(
        &self,
        scope: TurnScope<'_>,
        amount: Option<f64>,
        description: Option<String>,
    ) -> Result<Reply> {
        self.sessions
            .clear(scope.user_id, scope.conversation_id, SessionKind::EditExpense)
            .await?;
        self.sessions
            .clear(
                scope.user_id,
                scope.conversation_id,
                SessionKind::PendingConfirmation,
            )
            .await?;

        let Some(description) = description else {
            let session = AddExpenseSession::at(AddStep::Description);
            self.save_add(scope, &session).await?;
            return Ok(Reply::text(DESCRIPTION_PROMPT));
        };

        let mut session = AddExpenseSession::at(AddStep::Amount);
        session.description = Some(description.clone());

        match amount.filter(|a| a.is_finite() && *a > 0.0) {
            Some(amount) => self.accept_amount(scope, session, amount).await,
            None => {
                self.save_add(scope, &session).await?;
                Ok(Reply::text(amount_prompt(&description)))
            }
        }
    }

    /// Advance an existing add-flow by one message
    pub(crate) async fn continue_add(
        &self,
        scope: TurnScope<'_>,
        session: AddExpenseSession,
        message: &str,
    ) -> Result<Reply> {
        match session.step {
            AddStep::Description => self.add_description(scope, session, message).await,
            AddStep::Amount => self.add_amount(scope, session, message).await,
            AddStep::Category => self.add_category(scope, session, message).await,
            AddStep::Date => self.add_date(scope, session, message).await,
            AddStep::Confirmation => self.add_confirmation(scope, session, message).await,
        }
    }

    async fn add_description(
        &self,
        scope: TurnScope<'_>,
        mut session: AddExpenseSession,
        message: &str,
    ) -> Result<Reply> {
        // "spent $5 on coffee" as an answer fills both slots at once
        if let Some(natural) = parse_natural_expense(message) {
            session.description = Some(natural.description);
            session.step = AddStep::Amount;
            return self.accept_amount(scope, session, natural.amount).await;
        }

        let description = message.trim();
        if description.chars().count() < 2 {
            return Ok(Reply::text(
                "❌ Please describe the expense in at least 2 characters.",
            ));
        }

        session.description = Some(description.to_string());
        session.step = AddStep::Amount;
        self.save_add(scope, &session).await?;
        Ok(Reply::text(amount_prompt(description)))
    }

    async fn add_amount(
        &self,
        scope: TurnScope<'_>,
        session: AddExpenseSession,
        message: &str,
    ) -> Result<Reply> {
        match parse_amount(message).filter(|a| a.is_finite() && *a > 0.0) {
            Some(amount) => self.accept_amount(scope, session, amount).await,
            None => Ok(Reply::text(INVALID_AMOUNT)),
        }
    }

    /// Take an amount, warning once about unusually large values
    async fn accept_amount(
        &self,
        scope: TurnScope<'_>,
        mut session: AddExpenseSession,
        amount: f64,
    ) -> Result<Reply> {
        let threshold = self.config.amount_warning_threshold;
        if amount > threshold && session.unconfirmed_amount != Some(amount) {
            session.step = AddStep::Amount;
            session.unconfirmed_amount = Some(amount);
            self.save_add(scope, &session).await?;
            return Ok(Reply::text(format!(
                "⚠️ {} is more than {}. If that's right, enter the same amount again; \
                 otherwise type the correct amount.",
                money(amount),
                money(threshold)
            )));
        }

        let description = session.description.clone().unwrap_or_default();
        let suggested = self.advisor.suggest_category(&description).await;

        session.amount = Some(amount);
        session.unconfirmed_amount = None;
        session.suggested_category = Some(suggested);
        session.step = AddStep::Category;
        self.save_add(scope, &session).await?;

        Ok(Reply::text(category_prompt(&description, amount, suggested)))
    }

    async fn add_category(
        &self,
        scope: TurnScope<'_>,
        mut session: AddExpenseSession,
        message: &str,
    ) -> Result<Reply> {
        let category = match parse_category_reply(message) {
            CategoryReply::Chosen(category) => category,
            CategoryReply::AcceptSuggested => match session.suggested_category {
                Some(category) => category,
                None => {
                    let description = session.description.as_deref().unwrap_or_default();
                    self.advisor.suggest_category(description).await
                }
            },
        };

        session.category = Some(category);
        session.step = AddStep::Date;
        self.save_add(scope, &session).await?;
        Ok(Reply::text(format!("🏷️ Category: **{}**\n\n{}", category, DATE_PROMPT)))
    }

    async fn add_date(
        &self,
        scope: TurnScope<'_>,
        mut session: AddExpenseSession,
        message: &str,
    ) -> Result<Reply> {
        let date = parse_date(message, self.clock.today());
        session.date = Some(date);
        session.step = AddStep::Confirmation;
        self.save_add(scope, &session).await?;

        Ok(Reply::text(format!(
            "✅ Please confirm:\n\n📝 {}\n💰 {}\n🏷️ {}\n📅 {}\n\nReply **yes** to save or **no** to cancel.",
            session.description.as_deref().unwrap_or_default(),
            money(session.amount.unwrap_or_default()),
            session.category.unwrap_or(Category::Other),
            long_date(date)
        )))
    }

    async fn add_confirmation(
        &self,
        scope: TurnScope<'_>,
        session: AddExpenseSession,
        message: &str,
    ) -> Result<Reply> {
        if is_no(message) {
            self.clear_add(scope).await?;
            return Ok(Reply::text("❌ Okay, the expense was not saved."));
        }
        if !is_commit(message) {
            return Ok(Reply::text("Please reply **yes** to save or **no** to cancel."));
        }

        // Cleared whatever the outcome; a failed write is re-entered by the user
        self.clear_add(scope).await?;

        let (Some(text), Some(amount), Some(category), Some(date)) = (
            session.description,
            session.amount,
            session.category,
            session.date,
        ) else {
            warn!(user_id = %scope.user_id, "Confirmation reached with missing fields");
            return Ok(Reply::text(
                "❌ Some details went missing, so nothing was saved. Say **add expense** to start again.",
            ));
        };

        let expense = NewExpense {
            text,
            amount,
            category,
            date,
        };

        match self.records.create(scope.user_id, expense).await {
            Ok(record) => {
                info!(user_id = %scope.user_id, record_id = %record.id, "Expense created");
                Ok(Reply::changed(format!(
                    "✅ Saved **{}** for {} ({}) on {}.",
                    record.text,
                    money(record.amount),
                    record.category,
                    long_date(record.date)
                )))
            }
            Err(e) => {
                warn!(user_id = %scope.user_id, error = %e, "Expense create failed");
                Ok(Reply::text(format!(
                    "❌ I couldn't save that expense ({}). Please start again with **add expense**.",
                    e
                )))
            }
        }
    }

    async fn save_add(&self, scope: TurnScope<'_>, session: &AddExpenseSession) -> Result<()> {
        self.sessions
            .save(scope.user_id, scope.conversation_id, session)
            .await
    }

    pub(crate) async fn clear_add(&self, scope: TurnScope<'_>) -> Result<()> {
        self.sessions
            .clear(scope.user_id, scope.conversation_id, SessionKind::AddExpense)
            .await
    }
}
