//! Oracle clients.
//!
//! [`Oracle`] is the seam between this application and the generative
//! service: one opaque request/response round trip, no streaming, no
//! conversation state. [`HttpOracle`] is the production implementation
//! against a messages-style REST API; tests substitute scripted oracles.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::OracleConfig;
use crate::error::{OracleError, OracleResult};
use crate::types::{OracleRequest, OracleResponse};

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Cap on error-body text carried into [`OracleError::Transport`].
const ERROR_SNIPPET_CHARS: usize = 200;

/// The generative service, reduced to a single round trip.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send one request and await one reply.
    async fn send(&self, request: &OracleRequest) -> OracleResult<OracleResponse>;
}

/// HTTP client for a messages-style generation API.
#[derive(Clone)]
pub struct HttpOracle {
    config: OracleConfig,
    http: reqwest::Client,
}

impl HttpOracle {
    /// Build a client from `config`.
    ///
    /// The 120 s timeout lives here; timeouts are the client's concern,
    /// not the gateway's.
    pub fn new(config: OracleConfig) -> OracleResult<Self> {
        if config.api_key.is_empty() {
            return Err(OracleError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| OracleError::Transport {
                reason: format!("failed to build http client: {e}"),
            })?;

        Ok(Self { config, http })
    }

    /// Build the JSON body for one request.
    fn build_request_body(&self, request: &OracleRequest) -> Value {
        let content: Value = match &request.media {
            Some(media) => json!([
                {
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": media.mime_type,
                        "data": BASE64.encode(&media.data),
                    },
                },
                {"type": "text", "text": request.prompt},
            ]),
            None => json!(request.prompt),
        };

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{"role": "user", "content": content}],
        });

        if let Some(system) = system_text(request) {
            body["system"] = json!(system);
        }

        body
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn send(&self, request: &OracleRequest) -> OracleResult<OracleResponse> {
        let body = self.build_request_body(request);
        let url = format!("{}/v1/messages", self.config.base_url);

        debug!(
            url = %url,
            model = %self.config.model,
            has_media = request.media.is_some(),
            has_schema = request.schema.is_some(),
            "sending generation request"
        );

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Transport {
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| OracleError::Transport {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(OracleError::Transport {
                reason: format!("oracle returned {status}: {}", snippet(&text)),
            });
        }

        let envelope: Value =
            serde_json::from_str(&text).map_err(|e| OracleError::MalformedResponse {
                reason: format!("invalid JSON envelope: {e}"),
            })?;

        parse_reply(&envelope)
    }
}

/// Merge caller system framing with the schema instruction, when present.
///
/// The wire API has no structured-output mode, so a declared schema rides
/// in as an instruction; the gateway still validates the reply strictly.
fn system_text(request: &OracleRequest) -> Option<String> {
    match (&request.system, &request.schema) {
        (None, None) => None,
        (system, schema) => {
            let mut text = system.clone().unwrap_or_default();
            if let Some(schema) = schema {
                if !text.is_empty() {
                    text.push_str("\n\n");
                }
                text.push_str(
                    "Reply with a single JSON object conforming to this JSON Schema, \
                     and nothing else:\n",
                );
                text.push_str(&schema.to_string());
            }
            Some(text)
        }
    }
}

/// Extract the concatenated text blocks from a reply envelope.
fn parse_reply(envelope: &Value) -> OracleResult<OracleResponse> {
    let content = envelope["content"]
        .as_array()
        .ok_or_else(|| OracleError::MalformedResponse {
            reason: "missing `content` array in reply".into(),
        })?;

    let mut parts: Vec<String> = Vec::new();
    for block in content {
        if block["type"].as_str() == Some("text") {
            if let Some(t) = block["text"].as_str() {
                parts.push(t.to_owned());
            }
        }
    }

    Ok(OracleResponse {
        text: parts.join(""),
    })
}

fn snippet(text: &str) -> String {
    text.chars().take(ERROR_SNIPPET_CHARS).collect()
}

// ── tests ────────────────────────────────────────────────────────────
