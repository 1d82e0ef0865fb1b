//! Analysis and advice turns

use crate::advisor::faq_answer;
use crate::analysis::{
    analysis_prompt, is_biggest_category_question, is_budget_question, window_from_message,
    SpendingSummary, BUDGET_TIPS,
};
use crate::error::Result;
use crate::records::RecordFilter;

use super::core::DialogueEngine;
use super::helpers::money;
use super::types::{Reply, TurnScope};

impl DialogueEngine {
    /// Answer a question about the user's spending
    pub(crate) async fn analyze(&self, scope: TurnScope<'_>, message: &str) -> Result<Reply> {
        if is_budget_question(message) {
            return self.budget_tips(scope).await;
        }

        let today = self.clock.today();
        let window = window_from_message(message, today);
        let filter = window
            .as_ref()
            .map(|w| w.filter())
            .unwrap_or_else(RecordFilter::all);
        let label = window.as_ref().map_or("so far", |w| w.label.as_str());

        let records = self.records.find_many(scope.user_id, &filter).await?;
        let summary = SpendingSummary::from_records(&records);
        if records.is_empty() {
            return Ok(Reply::text(summary.render(label)));
        }

        if is_biggest_category_question(message) {
            if let Some((category, amount, share)) = summary.biggest() {
                return Ok(Reply::text(format!(
                    "🏆 Your biggest category {} is **{}** with {} ({:.1}% of your {} total).",
                    label,
                    category,
                    money(amount),
                    share,
                    money(summary.total)
                )));
            }
        }

        let prompt = analysis_prompt(message, &summary, window.as_ref(), &records, today);
        let text = self
            .advisor
            .generate(&prompt)
            .await
            .unwrap_or_else(|| summary.render(label));
        Ok(Reply::text(text))
    }

    /// Budgeting advice, grounded in the user's totals
    pub(crate) async fn advise(&self, scope: TurnScope<'_>, message: &str) -> Result<Reply> {
        if faq_answer(message).is_none() && is_budget_question(message) {
            return self.budget_tips(scope).await;
        }

        let records = self.all_records(scope).await?;
        let summary = SpendingSummary::from_records(&records);
        let context = if records.is_empty() {
            "The user has not recorded any expenses yet.".to_string()
        } else {
            format!(
                "The user has recorded {} across {} expenses. Category breakdown: {}.",
                money(summary.total),
                summary.count,
                summary.breakdown_line()
            )
        };

        Ok(Reply::text(
            self.advisor.generate_advice(message, &context).await,
        ))
    }

    async fn budget_tips(&self, scope: TurnScope<'_>) -> Result<Reply> {
        let records = self.all_records(scope).await?;
        let summary = SpendingSummary::from_records(&records);
        Ok(Reply::text(format!(
            "{}\n\n📊 You've recorded {} across {} expenses so far.",
            BUDGET_TIPS,
            money(summary.total),
            summary.count
        )))
    }
}
