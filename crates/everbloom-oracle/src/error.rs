//! Oracle error types.
//!
//! Every failure mode of a generation call collapses into [`OracleError`]
//! so call sites receive one discriminated result and can decide whether a
//! "try again" is worth offering. The gateway never retries on its own;
//! generation is paid, and whether re-generation is safe is feature
//! knowledge, not gateway knowledge.

use thiserror::Error;

/// Alias for `Result<T, OracleError>`.
pub type OracleResult<T> = Result<T, OracleError>;

/// Errors surfaced by the generation gateway and oracle clients.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle was unreachable or rejected the request (network failure,
    /// rate limit, non-2xx status).
    #[error("oracle transport error: {reason}")]
    Transport { reason: String },

    /// The oracle replied, but the content did not match the expected
    /// shape. Never coerced, never swallowed.
    #[error("malformed oracle response: {reason}")]
    MalformedResponse { reason: String },

    /// No API key was configured for the oracle client.
    #[error("missing oracle api key")]
    MissingApiKey,

    /// Oracle configuration could not be loaded or validated.
    #[error("invalid oracle config: {reason}")]
    InvalidConfig { reason: String },
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            reason: err.to_string(),
        }
    }
}
