//! Personalized paths.
//!
//! A path is a one-off, goal-driven sequence of steps generated for the
//! user: "I want to sleep better" becomes four or five concrete practices.
//! Unlike journeys there is no shared plan to memoize; beginning a path
//! always generates a fresh blueprint (an explicit, user-initiated paid
//! call), and beginning again is how regeneration happens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use everbloom_context::{ContextAggregator, EntrySource};
use everbloom_oracle::{Gateway, OracleRequest};
use everbloom_store::{StateCell, Store};

use crate::error::{FlowError, FlowResult};

const PATH_NAMESPACE: &str = "paths.state";
const PATH_SCHEMA_VERSION: u32 = 1;

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    /// Short step title.
    pub title: String,
    /// The practice itself.
    pub practice: String,
}

/// The generated plan for a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathBlueprint {
    /// The user's stated goal.
    pub goal: String,
    /// Ordered steps toward it.
    pub steps: Vec<PathStep>,
}

/// The persisted path in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathState {
    /// Identifier for this particular path instance.
    pub id: Uuid,
    /// The generated blueprint being walked.
    pub blueprint: PathBlueprint,
    /// Index of the next step (== steps.len() once finished).
    pub current_step: usize,
    /// When the path was generated.
    pub created_at: DateTime<Utc>,
}

impl PathState {
    /// Whether every step has been walked.
    pub fn is_finished(&self) -> bool {
        self.current_step >= self.blueprint.steps.len()
    }

    /// The next step to take, if any.
    pub fn next_step(&self) -> Option<&PathStep> {
        self.blueprint.steps.get(self.current_step)
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedBlueprint {
    steps: Vec<PathStep>,
}

/// The personalized path state machine.
#[derive(Clone)]
pub struct PathFlow {
    state: StateCell<Option<PathState>>,
    gateway: Gateway,
    aggregator: ContextAggregator,
}

impl PathFlow {
    pub fn new(store: Store, gateway: Gateway, aggregator: ContextAggregator) -> Self {
        Self {
            state: StateCell::new(store, PATH_NAMESPACE, PATH_SCHEMA_VERSION, || None),
            gateway,
            aggregator,
        }
    }

    /// Generate a blueprint for `goal` and make it the path in progress,
    /// replacing any previous path. Shared context personalizes the steps;
    /// without consent the path is generated from the goal alone.
    pub async fn begin(
        &self,
        goal: &str,
        sources: &[&dyn EntrySource],
    ) -> FlowResult<PathState> {
        let context = self.aggregator.build_context(sources, None).await;
        let request = OracleRequest::text(format!(
            "The user wants to work toward this goal: \"{goal}\". Lay out 3 to \
             6 small, ordered steps, each with a title and one concrete \
             practice.\n\nShared context:\n{}",
            context.as_prompt_block(),
        ))
        .with_system("You are a warm, grounded personal-growth guide.")
        .with_schema(blueprint_schema());

        let generated: GeneratedBlueprint = self.gateway.generate_json(request).await?;
        let state = PathState {
            id: Uuid::now_v7(),
            blueprint: PathBlueprint {
                goal: goal.to_owned(),
                steps: generated.steps,
            },
            current_step: 0,
            created_at: Utc::now(),
        };

        self.state.set(&Some(state.clone())).await?;
        info!(goal, steps = state.blueprint.steps.len(), "path begun");
        Ok(state)
    }

    /// The path in progress, if any.
    pub async fn current(&self) -> Option<PathState> {
        self.state.get().await
    }

    /// Mark the current step done and move to the next.
    pub async fn advance(&self) -> FlowResult<PathState> {
        let Some(mut state) = self.state.get().await else {
            return Err(FlowError::PathNotStarted);
        };
        if !state.is_finished() {
            state.current_step += 1;
        }
        self.state.set(&Some(state.clone())).await?;
        Ok(state)
    }

    /// Drop the path in progress entirely.
    pub async fn reset(&self) -> FlowResult<()> {
        self.state.set(&None).await?;
        Ok(())
    }
}

fn blueprint_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["steps"],
        "properties": {
            "steps": {
                "type": "array",
                "minItems": 3,
                "maxItems": 6,
                "items": {
                    "type": "object",
                    "required": ["title", "practice"],
                    "properties": {
                        "title": {"type": "string"},
                        "practice": {"type": "string"},
                    },
                },
            },
        },
    })
}

// ── tests ────────────────────────────────────────────────────────────
