//! Guided multi-day journeys.
//!
//! A journey is a short program (say, "7 days of grounding") whose day
//! plan is generated once per journey slug and then memoized; starting
//! the same journey again later reuses the plan. Progress is a separate
//! persisted record: one active journey at a time, day completions are
//! idempotent, and abandoning only clears progress, never the plan.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use everbloom_context::{ContextAggregator, EntrySource};
use everbloom_oracle::{Gateway, OracleRequest};
use everbloom_store::{ContentCache, StateCell, Store};

use crate::error::{FlowError, FlowResult};

const PLANS_NAMESPACE: &str = "journeys.plans";
const PROGRESS_NAMESPACE: &str = "journeys.progress";
const JOURNEY_SCHEMA_VERSION: u32 = 1;

/// One day of a journey plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyDay {
    /// 1-based day number.
    pub day: u32,
    /// The day's theme.
    pub theme: String,
    /// One short practice for the day.
    pub practice: String,
}

/// A complete generated journey plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyPlan {
    /// Stable identifier the plan is memoized under.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// The day-by-day program.
    pub days: Vec<JourneyDay>,
}

/// The user's progress through the active journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyProgress {
    /// Which plan this progress belongs to.
    pub slug: String,
    /// When the journey was started.
    pub started_at: DateTime<Utc>,
    /// The next day to practice (1-based, clamped to the last day).
    pub current_day: u32,
    /// Days completed so far, ascending.
    pub completed: Vec<u32>,
    /// The user's reflection per completed day.
    pub reflections: BTreeMap<u32, String>,
}

/// Wire shape for plan generation; the slug and title are ours, not the
/// oracle's.
#[derive(Debug, Deserialize)]
struct GeneratedPlan {
    days: Vec<JourneyDay>,
}

/// The journey state machine.
#[derive(Clone)]
pub struct JourneyFlow {
    plans: ContentCache<JourneyPlan>,
    progress: StateCell<Option<JourneyProgress>>,
    gateway: Gateway,
    aggregator: ContextAggregator,
}

impl JourneyFlow {
    pub fn new(store: Store, gateway: Gateway, aggregator: ContextAggregator) -> Self {
        Self {
            plans: ContentCache::new(store.clone(), PLANS_NAMESPACE, JOURNEY_SCHEMA_VERSION),
            progress: StateCell::new(
                store,
                PROGRESS_NAMESPACE,
                JOURNEY_SCHEMA_VERSION,
                || None,
            ),
            gateway,
            aggregator,
        }
    }

    /// Start (or restart) the journey identified by `slug`.
    ///
    /// The plan is generated on the first start only; any shared context
    /// personalizes that first generation. Starting replaces whatever
    /// journey was previously in progress.
    pub async fn start(
        &self,
        slug: &str,
        title: &str,
        length_days: u32,
        sources: &[&dyn EntrySource],
    ) -> FlowResult<JourneyPlan> {
        let plan = self
            .plans
            .get_or_generate(slug, || async {
                let context = self.aggregator.build_context(sources, None).await;
                let request = OracleRequest::text(format!(
                    "Design a {length_days}-day guided journey called \"{title}\". \
                     For each day give a short theme and one concrete practice. \
                     Where it helps, ground the days in what the user has shared.\n\n\
                     Shared context:\n{}",
                    context.as_prompt_block(),
                ))
                .with_system("You are a warm, grounded personal-growth guide.")
                .with_schema(plan_schema());

                let generated: GeneratedPlan = self.gateway.generate_json(request).await?;
                Ok::<JourneyPlan, FlowError>(JourneyPlan {
                    slug: slug.to_owned(),
                    title: title.to_owned(),
                    days: generated.days,
                })
            })
            .await?;

        self.progress
            .set(&Some(JourneyProgress {
                slug: slug.to_owned(),
                started_at: Utc::now(),
                current_day: 1,
                completed: Vec::new(),
                reflections: BTreeMap::new(),
            }))
            .await?;

        info!(slug, days = plan.days.len(), "journey started");
        Ok(plan)
    }

    /// The active journey's progress, if any.
    pub async fn active(&self) -> Option<JourneyProgress> {
        self.progress.get().await
    }

    /// The memoized plan for `slug`, if it was ever generated.
    pub async fn plan(&self, slug: &str) -> Option<JourneyPlan> {
        self.plans.get(slug).await
    }

    /// Mark `day` complete with the user's reflection.
    ///
    /// Completing an already-completed day updates the reflection and is
    /// otherwise a no-op; addressing a day outside the plan is an error.
    pub async fn complete_day(&self, day: u32, reflection: &str) -> FlowResult<JourneyProgress> {
        let Some(mut progress) = self.progress.get().await else {
            return Err(FlowError::JourneyNotStarted);
        };
        let plan = self
            .plans
            .get(&progress.slug)
            .await
            .ok_or(FlowError::JourneyNotStarted)?;

        let total = plan.days.len() as u32;
        if day == 0 || day > total {
            return Err(FlowError::DayOutOfRange { day, total });
        }

        if !progress.completed.contains(&day) {
            progress.completed.push(day);
            progress.completed.sort_unstable();
        }
        progress.reflections.insert(day, reflection.to_owned());
        progress.current_day = progress
            .completed
            .iter()
            .copied()
            .max()
            .map(|d| (d + 1).min(total))
            .unwrap_or(1);

        self.progress.set(&Some(progress.clone())).await?;
        info!(slug = %progress.slug, day, "journey day completed");
        Ok(progress)
    }

    /// Whether every day of the active journey is complete.
    pub async fn is_finished(&self) -> bool {
        let Some(progress) = self.progress.get().await else {
            return false;
        };
        match self.plans.get(&progress.slug).await {
            Some(plan) => progress.completed.len() == plan.days.len(),
            None => false,
        }
    }

    /// Drop the active journey. The memoized plan survives, so restarting
    /// is free.
    pub async fn abandon(&self) -> FlowResult<()> {
        self.progress.set(&None).await?;
        Ok(())
    }
}

fn plan_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["days"],
        "properties": {
            "days": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["day", "theme", "practice"],
                    "properties": {
                        "day": {"type": "integer"},
                        "theme": {"type": "string"},
                        "practice": {"type": "string"},
                    },
                },
            },
        },
    })
}

// ── tests ────────────────────────────────────────────────────────────
