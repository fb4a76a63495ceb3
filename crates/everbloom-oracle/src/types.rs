//! Request and response shapes for oracle calls.

use serde_json::Value;

/// An image (or other binary attachment) sent alongside a prompt.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Raw bytes; encoded for the wire by the client.
    pub data: Vec<u8>,
}

/// A single generation request.
///
/// Modality is implied by the fields: a bare prompt is a text request, a
/// `schema` asks for structured JSON, and `media` attaches an image.
#[derive(Debug, Clone, Default)]
pub struct OracleRequest {
    /// The user-facing prompt.
    pub prompt: String,
    /// Optional system framing for the request.
    pub system: Option<String>,
    /// JSON Schema the reply should conform to, when structured output is
    /// expected.
    pub schema: Option<Value>,
    /// Optional binary attachment.
    pub media: Option<MediaPayload>,
}

impl OracleRequest {
    /// A plain text request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Attach system framing.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Declare the JSON shape the reply must match.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Attach an image.
    pub fn with_media(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.media = Some(MediaPayload {
            mime_type: mime_type.into(),
            data,
        });
        self
    }
}

/// The oracle's raw textual reply, before any shape validation.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleResponse {
    /// Concatenated text content of the reply.
    pub text: String,
}

// ── tests ────────────────────────────────────────────────────────────
