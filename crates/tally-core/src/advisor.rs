//! Advisor - text generation with static fallbacks
//!
//! Wraps the [`TextGenerator`] collaborator:
//! - `suggest_category`: cached per normalised description, falls back to `Other`
//! - `generate_advice`: FAQ table, then the generator, then a canned answer
//! - `generate`: raw prompt, `None` on failure
//!
//! No method here returns an error; generator failures are logged and replaced.

use crate::category::Category;
use std::sync::Arc;
use std::time::Duration;
use tally_cache::CacheClient;
use tally_llm::TextGenerator;
use tracing::{debug, warn};

/// How long category suggestions are cached (2 hours)
pub const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(7200);

/// Returned when no advice can be generated
pub const FALLBACK_ADVICE: &str = "💡 A good place to start: track every expense, set a monthly \
    limit for each category, and review your biggest categories once a week. The 50/30/20 rule \
    (50% needs, 30% wants, 20% savings) is a simple budget to begin with.";

/// Quick answers keyed by normalised question
const COMMON_FAQS: &[(&str, &str)] = &[
    (
        "how_to_save_money",
        "Track your expenses daily, set a budget for each category, and look for patterns in \
         your spending. Consider the 50/30/20 rule: 50% needs, 30% wants, 20% savings.",
    ),
    (
        "best_budgeting_tips",
        "Start with tracking all expenses for a month, categorize them, set realistic limits for \
         each category, and review weekly. Use the envelope method for discretionary spending.",
    ),
    (
        "reduce_food_expenses",
        "Plan meals weekly, cook at home more often, buy generic brands, use coupons, and avoid \
         impulse purchases. Batch cooking can save both time and money.",
    ),
    (
        "transportation_savings",
        "Consider carpooling, public transport, walking, or biking. Maintain your vehicle \
         regularly to avoid costly repairs, and compare gas prices.",
    ),
    (
        "entertainment_budget",
        "Set a monthly entertainment limit, look for free activities, use streaming services \
         instead of cable, and take advantage of happy hours and discounts.",
    ),
];

/// Normalise free text into a cache/FAQ key: lowercase, punctuation dropped,
/// whitespace runs joined by `_`, at most 50 characters
#[must_use]
pub fn normalize_key(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(50)
        .collect()
}

/// Canned answer for a common question
#[must_use]
pub fn faq_answer(question: &str) -> Option<&'static str> {
    let key = normalize_key(question);
    COMMON_FAQS
        .iter()
        .find(|(faq, _)| *faq == key)
        .map(|(_, answer)| *answer)
}

/// Category suggestion and advice on top of the text generator
#[derive(Clone)]
pub struct Advisor {
    generator: Arc<dyn TextGenerator>,
    cache: Arc<CacheClient>,
    category_ttl: Duration,
}

impl Advisor {
    /// Create an advisor
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>, cache: Arc<CacheClient>) -> Self {
        Self {
            generator,
            cache,
            category_ttl: CATEGORY_CACHE_TTL,
        }
    }

    /// Suggest a category for a description
    pub async fn suggest_category(&self, description: &str) -> Category {
        let key = format!("category:{}", normalize_key(description));

        match self.cache.get_json::<Category>(&key).await {
            Ok(Some(category)) => {
                debug!(key = %key, category = %category, "Category suggestion cache hit");
                return category;
            }
            Ok(None) => {}
            Err(e) => debug!(key = %key, error = %e, "Category cache unreadable"),
        }

        let prompt = format!(
            "Categorize this expense into exactly one of these categories: {}.\n\
             Expense: \"{}\"\n\
             Reply with the category name only.",
            Category::choices(),
            description
        );

        match self.generator.generate(&prompt).await {
            Ok(reply) => {
                let category = Category::from_name(&reply)
                    .or_else(|| Category::detect(&reply))
                    .unwrap_or(Category::Other);
                if let Err(e) = self.cache.set_json(&key, &category, self.category_ttl).await {
                    debug!(key = %key, error = %e, "Failed to cache category suggestion");
                }
                category
            }
            Err(e) => {
                warn!(error = %e, "Category suggestion failed, using Other");
                Category::Other
            }
        }
    }

    /// Answer a general budgeting question
    pub async fn generate_advice(&self, question: &str, context: &str) -> String {
        if let Some(answer) = faq_answer(question) {
            return format!("💡 {}", answer);
        }

        let prompt = format!(
            "The user asks for personal finance advice: \"{}\"\n\n{}\n\n\
             Give practical, concise advice.",
            question, context
        );
        self.generate(&prompt)
            .await
            .unwrap_or_else(|| FALLBACK_ADVICE.to_string())
    }

    /// Run a raw prompt; `None` when the generator fails
    pub async fn generate(&self, prompt: &str) -> Option<String> {
        match self.generator.generate(prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Text generation failed");
                None
            }
        }
    }
}
