//! The wound quiz and its follow-up exercises.
//!
//! A short fixed questionnaire leads to a generated "core wound" reading
//! (one archetype plus a summary and affirmation). Exercises for an
//! archetype are memoized per archetype name, so two users-sessions that
//! land on "abandonment" pay for that exercise plan once. Context for the
//! exercises is themed by the archetype — only entries touching on it are
//! shared, and only with consent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use everbloom_context::{ContextAggregator, EntrySource};
use everbloom_oracle::{Gateway, OracleRequest};
use everbloom_store::{ContentCache, StateCell, Store};

use crate::error::{FlowError, FlowResult};

const QUIZ_NAMESPACE: &str = "quiz.state";
const EXERCISES_NAMESPACE: &str = "quiz.exercises";
const QUIZ_SCHEMA_VERSION: u32 = 1;

/// One quiz question with its fixed choices.
#[derive(Debug, Clone, Copy)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub choices: [&'static str; 4],
}

/// The questionnaire. Order and indices are stable — answers are stored
/// by question index.
pub static QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        prompt: "When someone close pulls away, your first feeling is...",
        choices: [
            "panic that they are leaving",
            "relief at the space",
            "anger that they dare",
            "numbness",
        ],
    },
    QuizQuestion {
        prompt: "Praise at work or among friends makes you...",
        choices: [
            "suspicious of the motive",
            "quietly uncomfortable",
            "hungry for more",
            "dismissive of yourself",
        ],
    },
    QuizQuestion {
        prompt: "When you think about asking for help, you...",
        choices: [
            "never do, you manage alone",
            "apologize while asking",
            "expect to be refused",
            "feel you have no right to",
        ],
    },
    QuizQuestion {
        prompt: "Conflict in a relationship mostly makes you want to...",
        choices: [
            "fix it immediately at any cost",
            "disappear until it blows over",
            "win",
            "give in and keep the peace",
        ],
    },
    QuizQuestion {
        prompt: "Alone on a free evening, you usually feel...",
        choices: [
            "abandoned",
            "finally safe",
            "restless",
            "empty",
        ],
    },
];

/// The generated reading of the user's core wound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoundReading {
    /// The wound archetype (e.g. "abandonment"). Also the exercise cache
    /// key.
    pub archetype: String,
    /// What the answers suggest, in kind words.
    pub summary: String,
    /// A short affirmation to return to.
    pub affirmation: String,
}

/// One healing exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub title: String,
    pub instructions: String,
    pub duration_minutes: u32,
}

/// The generated exercise plan for one archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePlan {
    pub exercises: Vec<Exercise>,
}

/// Persisted quiz progress and result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizState {
    /// Chosen choice index per question index.
    pub answers: BTreeMap<u32, u32>,
    /// The reading, once the quiz has been submitted successfully.
    pub result: Option<WoundReading>,
}

/// The quiz state machine.
#[derive(Clone)]
pub struct QuizFlow {
    state: StateCell<QuizState>,
    exercises: ContentCache<ExercisePlan>,
    gateway: Gateway,
    aggregator: ContextAggregator,
}

impl QuizFlow {
    pub fn new(store: Store, gateway: Gateway, aggregator: ContextAggregator) -> Self {
        Self {
            state: StateCell::new(
                store.clone(),
                QUIZ_NAMESPACE,
                QUIZ_SCHEMA_VERSION,
                QuizState::default,
            ),
            exercises: ContentCache::new(store, EXERCISES_NAMESPACE, QUIZ_SCHEMA_VERSION),
            gateway,
            aggregator,
        }
    }

    /// The questionnaire, for rendering.
    pub fn questions() -> &'static [QuizQuestion] {
        QUESTIONS
    }

    /// Record an answer. Re-answering a question overwrites.
    pub async fn answer(&self, question: u32, choice: u32) -> FlowResult<()> {
        let valid = QUESTIONS
            .get(question as usize)
            .is_some_and(|q| (choice as usize) < q.choices.len());
        if !valid {
            return Err(FlowError::InvalidAnswer { question, choice });
        }

        self.state
            .update(|s| {
                s.answers.insert(question, choice);
            })
            .await?;
        Ok(())
    }

    /// Current persisted quiz state.
    pub async fn state(&self) -> QuizState {
        self.state.get().await
    }

    /// The reading, if the quiz has been completed.
    pub async fn reading(&self) -> Option<WoundReading> {
        self.state.get().await.result
    }

    /// Submit the quiz for a reading.
    ///
    /// Requires every question answered. Submitting again after a
    /// successful reading returns the stored reading without another
    /// generation.
    pub async fn submit(&self) -> FlowResult<WoundReading> {
        let state = self.state.get().await;
        if let Some(reading) = state.result {
            return Ok(reading);
        }

        let answered = (0..QUESTIONS.len() as u32)
            .filter(|q| state.answers.contains_key(q))
            .count();
        let missing = QUESTIONS.len() - answered;
        if missing > 0 {
            return Err(FlowError::QuizIncomplete { missing });
        }

        let request = OracleRequest::text(format!(
            "From these questionnaire answers, name the user's core emotional \
             wound as a single lowercase archetype word, with a kind two-to-three \
             sentence summary and one short affirmation.\n\n{}",
            render_answers(&state.answers),
        ))
        .with_system("You are a careful, compassionate therapist's assistant.")
        .with_schema(reading_schema());

        let reading: WoundReading = self.gateway.generate_json(request).await?;
        self.state
            .update({
                let reading = reading.clone();
                move |s| s.result = Some(reading)
            })
            .await?;

        info!(archetype = %reading.archetype, "wound reading stored");
        Ok(reading)
    }

    /// The exercise plan for the user's archetype — generated once per
    /// archetype, themed context included with consent.
    pub async fn exercises(&self, sources: &[&dyn EntrySource]) -> FlowResult<ExercisePlan> {
        let reading = self.reading().await.ok_or(FlowError::QuizNotCompleted)?;

        self.exercises
            .get_or_generate(&reading.archetype, || async {
                let context = self
                    .aggregator
                    .build_context(sources, Some(&reading.archetype))
                    .await;
                let request = OracleRequest::text(format!(
                    "Suggest 3 short healing exercises for someone working with \
                     the \"{}\" wound. Each needs a title, plain instructions, \
                     and a duration in minutes.\n\nShared context:\n{}",
                    reading.archetype,
                    context.as_prompt_block(),
                ))
                .with_system("You are a careful, compassionate therapist's assistant.")
                .with_schema(exercises_schema());

                let plan: ExercisePlan = self.gateway.generate_json(request).await?;
                Ok::<ExercisePlan, FlowError>(plan)
            })
            .await
    }

    /// Clear answers and reading. Exercise plans stay cached — they are
    /// keyed by archetype, not by attempt.
    pub async fn reset(&self) -> FlowResult<()> {
        self.state.set(&QuizState::default()).await?;
        Ok(())
    }
}

fn render_answers(answers: &BTreeMap<u32, u32>) -> String {
    let mut out = String::new();
    for (question, choice) in answers {
        if let Some(q) = QUESTIONS.get(*question as usize) {
            out.push_str(&format!(
                "Q: {}\nA: {}\n",
                q.prompt,
                q.choices.get(*choice as usize).copied().unwrap_or("?"),
            ));
        }
    }
    out
}

fn reading_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["archetype", "summary", "affirmation"],
        "properties": {
            "archetype": {"type": "string"},
            "summary": {"type": "string"},
            "affirmation": {"type": "string"},
        },
    })
}

fn exercises_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "required": ["exercises"],
        "properties": {
            "exercises": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["title", "instructions", "duration_minutes"],
                    "properties": {
                        "title": {"type": "string"},
                        "instructions": {"type": "string"},
                        "duration_minutes": {"type": "integer"},
                    },
                },
            },
        },
    })
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedSource, TestHarness, json_reply};
    use everbloom_context::ModuleId;
    use serde_json::json;

    fn reading_json() -> serde_json::Value {
        json!({
            "archetype": "abandonment",
            "summary": "Closeness has felt unsafe to lose.",
            "affirmation": "I am allowed to stay.",
        })
    }

    fn exercises_json() -> serde_json::Value {
        json!({
            "exercises": [
                {"title": "Letter", "instructions": "Write to your younger self.", "duration_minutes": 15},
                {"title": "Anchor", "instructions": "Name five things you can see.", "duration_minutes": 3},
                {"title": "Reach out", "instructions": "Message someone safe.", "duration_minutes": 5},
            ],
        })
    }

    fn flow(h: &TestHarness) -> QuizFlow {
        QuizFlow::new(h.store.clone(), h.gateway.clone(), h.aggregator.clone())
    }

    async fn answer_all(quiz: &QuizFlow) {
        for i in 0..QUESTIONS.len() as u32 {
            quiz.answer(i, 0).await.unwrap();
        }
    }

    #[tokio::test]
    async fn invalid_answers_are_rejected() {
        let h = TestHarness::new().await;
        let quiz = flow(&h);

        assert!(matches!(
            quiz.answer(99, 0).await,
            Err(FlowError::InvalidAnswer { question: 99, .. })
        ));
        assert!(matches!(
            quiz.answer(0, 7).await,
            Err(FlowError::InvalidAnswer { choice: 7, .. })
        ));
    }

    #[tokio::test]
    async fn incomplete_quiz_cannot_be_submitted() {
        let h = TestHarness::new().await;
        let quiz = flow(&h);
        quiz.answer(0, 1).await.unwrap();
        quiz.answer(1, 2).await.unwrap();

        let missing = QUESTIONS.len() - 2;
        match quiz.submit().await {
            Err(FlowError::QuizIncomplete { missing: m }) => assert_eq!(m, missing),
            other => panic!("expected QuizIncomplete, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_generates_and_stores_the_reading() {
        let h = TestHarness::new().await;
        h.oracle.push_reply(json_reply(reading_json()));
        let quiz = flow(&h);
        answer_all(&quiz).await;

        let reading = quiz.submit().await.unwrap();
        assert_eq!(reading.archetype, "abandonment");
        assert_eq!(quiz.reading().await, Some(reading.clone()));

        // Submitting again returns the stored reading, no new call.
        let again = quiz.submit().await.unwrap();
        assert_eq!(again, reading);
        assert_eq!(h.oracle.calls(), 1);

        // The prompt carried the chosen answer text.
        let prompt = h.oracle.last_prompt();
        assert!(prompt.contains("panic that they are leaving"));
    }

    #[tokio::test]
    async fn exercises_require_a_completed_quiz() {
        let h = TestHarness::new().await;
        let quiz = flow(&h);

        assert!(matches!(
            quiz.exercises(&[]).await,
            Err(FlowError::QuizNotCompleted)
        ));
    }

    #[tokio::test]
    async fn exercises_are_memoized_per_archetype() {
        let h = TestHarness::new().await;
        h.oracle.push_reply(json_reply(reading_json()));
        h.oracle.push_reply(json_reply(exercises_json()));
        let quiz = flow(&h);
        answer_all(&quiz).await;
        quiz.submit().await.unwrap();

        let plan = quiz.exercises(&[]).await.unwrap();
        assert_eq!(plan.exercises.len(), 3);

        let again = quiz.exercises(&[]).await.unwrap();
        assert_eq!(again, plan);
        assert_eq!(h.oracle.calls(), 2);
    }

    #[tokio::test]
    async fn exercises_context_is_themed_by_archetype() {
        let h = TestHarness::new().await;
        h.allow(ModuleId::Journal).await;
        h.oracle.push_reply(json_reply(reading_json()));
        h.oracle.push_reply(json_reply(exercises_json()));
        let quiz = flow(&h);
        answer_all(&quiz).await;
        quiz.submit().await.unwrap();

        let journal = FixedSource::with_entries(
            ModuleId::Journal,
            &[
                ("On abandonment", "the old fear of being left again"),
                ("Groceries", "bought apples and bread"),
            ],
        );
        quiz.exercises(&[&journal]).await.unwrap();

        let prompt = h.oracle.last_prompt();
        assert!(prompt.contains("being left again"));
        assert!(!prompt.contains("apples and bread"));
    }

    #[tokio::test]
    async fn reset_clears_answers_but_keeps_exercise_plans() {
        let h = TestHarness::new().await;
        h.oracle.push_reply(json_reply(reading_json()));
        h.oracle.push_reply(json_reply(exercises_json()));
        let quiz = flow(&h);
        answer_all(&quiz).await;
        quiz.submit().await.unwrap();
        quiz.exercises(&[]).await.unwrap();

        quiz.reset().await.unwrap();
        assert_eq!(quiz.state().await, QuizState::default());

        // A re-taken quiz landing on the same archetype reuses the plan.
        h.oracle.push_reply(json_reply(reading_json()));
        answer_all(&quiz).await;
        quiz.submit().await.unwrap();
        let plan = quiz.exercises(&[]).await.unwrap();
        assert_eq!(plan.exercises.len(), 3);
        assert_eq!(h.oracle.calls(), 3);
    }
}
