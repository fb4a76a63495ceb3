//! Weekly reviews.
//!
//! One review per ISO week, memoized under keys like `2026-W31` so the
//! paid synthesis happens once per week no matter how often the screen is
//! opened. Regeneration exists but only as an explicit user action — it
//! overwrites the cached review rather than racing it.
//!
//! Consent shapes the outcome: with sharing fully disabled the review is
//! generated without personal context (expected steady state); with
//! sharing enabled but nothing written, the user is told to write first.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use everbloom_context::{ContextAggregator, ContextOutcome, EntrySource, NO_CONTEXT_SENTINEL};
use everbloom_oracle::{Gateway, OracleRequest};
use everbloom_store::{ContentCache, Store};

use crate::error::{FlowError, FlowResult};

const REVIEWS_NAMESPACE: &str = "reviews.weekly";
const REVIEW_SCHEMA_VERSION: u32 = 1;

/// A generated look back over one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReview {
    /// ISO week key, e.g. `2026-W31`.
    pub week: String,
    /// Narrative summary of the week.
    pub summary: String,
    /// A few moments worth keeping.
    pub highlights: Vec<String>,
    /// One gentle suggestion for the coming week.
    pub gentle_suggestion: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedReview {
    summary: String,
    highlights: Vec<String>,
    gentle_suggestion: String,
}

/// The ISO week key a date falls in.
pub fn week_key(date: DateTime<Utc>) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// The weekly review flow.
#[derive(Clone)]
pub struct ReviewFlow {
    reviews: ContentCache<WeeklyReview>,
    gateway: Gateway,
    aggregator: ContextAggregator,
}

impl ReviewFlow {
    pub fn new(store: Store, gateway: Gateway, aggregator: ContextAggregator) -> Self {
        Self {
            reviews: ContentCache::new(store, REVIEWS_NAMESPACE, REVIEW_SCHEMA_VERSION),
            gateway,
            aggregator,
        }
    }

    /// The review for the week containing `date` — generated on first
    /// request, cached afterwards.
    pub async fn review_for(
        &self,
        date: DateTime<Utc>,
        sources: &[&dyn EntrySource],
    ) -> FlowResult<WeeklyReview> {
        let week = week_key(date);
        self.reviews
            .get_or_generate(&week, || async {
                self.generate(&week, sources).await
            })
            .await
    }

    /// Regenerate this week's review, overwriting the cached one. Explicit
    /// user action only — nothing in the core calls this as a fallback.
    pub async fn regenerate(
        &self,
        date: DateTime<Utc>,
        sources: &[&dyn EntrySource],
    ) -> FlowResult<WeeklyReview> {
        let week = week_key(date);
        let review = self.generate(&week, sources).await?;
        self.reviews.put(&week, review.clone()).await?;
        info!(week, "weekly review regenerated");
        Ok(review)
    }

    /// The cached review for the week containing `date`, if any.
    pub async fn cached(&self, date: DateTime<Utc>) -> Option<WeeklyReview> {
        self.reviews.get(&week_key(date)).await
    }

    async fn generate(
        &self,
        week: &str,
        sources: &[&dyn EntrySource],
    ) -> FlowResult<WeeklyReview> {
        let context = self.aggregator.build_context(sources, None).await;
        let context_block = match &context {
            ContextOutcome::Available(text) => text.as_str(),
            // Nothing shareable at all: degrade silently to a generic review.
            ContextOutcome::SharingDisabled => NO_CONTEXT_SENTINEL,
            // Sharing is on but there is nothing to synthesize from.
            ContextOutcome::NoRelevantEntries => return Err(FlowError::NothingToReview),
        };

        let request = OracleRequest::text(format!(
            "Write a short, kind review of the user's week ({week}). Summarize \
             what moved, pick a few highlights, and close with one gentle \
             suggestion.\n\nShared context:\n{context_block}",
        ))
        .with_system("You are a warm, grounded personal-growth guide.")
        .with_schema(review_schema());

        let generated: GeneratedReview = self.gateway.generate_json(request).await?;
        Ok(WeeklyReview {
            week: week.to_owned(),
            summary: generated.summary,
            highlights: generated.highlights,
            gentle_suggestion: generated.gentle_suggestion,
        })
    }
}

fn review_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["summary", "highlights", "gentle_suggestion"],
        "properties": {
            "summary": {"type": "string"},
            "highlights": {"type": "array", "items": {"type": "string"}},
            "gentle_suggestion": {"type": "string"},
        },
    })
}

// ── tests ────────────────────────────────────────────────────────────
