//! The generation gateway.
//!
//! Every generation call in the application funnels through one [`Gateway`]
//! instance wrapping one oracle client. The gateway owns request shaping
//! and response validation; it deliberately does **not** own retries: a
//! failed generation is cheap to retry later because the content cache
//! stores nothing on failure.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::client::Oracle;
use crate::error::{OracleError, OracleResult};
use crate::types::OracleRequest;

/// The single chokepoint for oracle calls.
#[derive(Clone)]
pub struct Gateway {
    oracle: Arc<dyn Oracle>,
}

impl Gateway {
    /// Wrap an oracle client. One gateway per process, passed by reference
    /// into whatever needs it.
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    /// Free-form text generation.
    pub async fn generate_text(&self, request: OracleRequest) -> OracleResult<String> {
        let response = self.oracle.send(&request).await?;
        debug!(chars = response.text.len(), "text generation complete");
        Ok(response.text)
    }

    /// Structured generation: the reply must parse as `T` or the call fails
    /// with [`OracleError::MalformedResponse`].
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        request: OracleRequest,
    ) -> OracleResult<T> {
        let response = self.oracle.send(&request).await?;
        parse_json_reply(&response.text)
    }

    /// Structured generation grounded on an image.
    pub async fn generate_from_image<T: DeserializeOwned>(
        &self,
        request: OracleRequest,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> OracleResult<T> {
        self.generate_json(request.with_media(mime_type, bytes)).await
    }
}

/// Parse a raw reply into `T`, tolerating markdown code fences but nothing
/// else. An empty reply where JSON was requested is malformed, not empty
/// success.
fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> OracleResult<T> {
    let trimmed = strip_code_fences(raw);

    if trimmed.is_empty() {
        return Err(OracleError::MalformedResponse {
            reason: "empty reply where JSON was requested".into(),
        });
    }

    serde_json::from_str(trimmed).map_err(|e| {
        warn!(%e, "oracle reply failed shape validation");
        OracleError::MalformedResponse {
            reason: format!("reply does not match the requested shape: {e}"),
        }
    })
}

/// Oracles habitually wrap JSON replies in ```json fences; strip one
/// outer fence pair if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

// ── tests ────────────────────────────────────────────────────────────
