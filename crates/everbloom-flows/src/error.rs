//! Flow error types.
//!
//! Flows sit on top of the store and the gateway, so most failures are
//! just those errors passing through. The flow-specific variants are the
//! ones a UI turns into guidance rather than an error toast: an
//! unanswered quiz, a review with nothing to draw on.

use thiserror::Error;

use everbloom_oracle::OracleError;
use everbloom_store::StoreError;

/// Alias for `Result<T, FlowError>`.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors surfaced by the feature flows.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Persistence failed underneath the flow.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A generation call failed; retrying is safe because nothing was
    /// cached.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Modules were willing to share, but there is nothing written yet to
    /// review. The remedy is more entries, not a retry.
    #[error("no shared entries to review yet")]
    NothingToReview,

    /// A journey operation was attempted with no journey in progress.
    #[error("no journey in progress")]
    JourneyNotStarted,

    /// A day outside the journey plan was addressed.
    #[error("day {day} is out of range for a {total}-day journey")]
    DayOutOfRange { day: u32, total: u32 },

    /// A path operation was attempted with no path in progress.
    #[error("no path in progress")]
    PathNotStarted,

    /// The quiz was submitted with unanswered questions.
    #[error("quiz incomplete: {missing} question(s) unanswered")]
    QuizIncomplete { missing: usize },

    /// Exercises were requested before the quiz produced a reading.
    #[error("the quiz has not been completed yet")]
    QuizNotCompleted,

    /// An answer referenced a question or choice that does not exist.
    #[error("invalid answer: question {question}, choice {choice}")]
    InvalidAnswer { question: u32, choice: u32 },
}
