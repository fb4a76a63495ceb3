//! # everbloom-oracle
//!
//! The generation gateway — the single chokepoint between Everbloom and
//! the external generative service.
//!
//! The [`Oracle`] trait reduces the service to one opaque request/response
//! round trip. [`HttpOracle`] implements it over HTTP; the [`Gateway`]
//! layers request shaping and strict response validation on top and is the
//! only type the rest of the application talks to:
//!
//! - [`Gateway::generate_text`]: free-form text.
//! - [`Gateway::generate_json`]: structured output, validated against the
//!   requested Rust shape; a non-conforming reply is a typed error, never
//!   a coerced value and never a panic.
//! - [`Gateway::generate_from_image`]: structured output grounded on an
//!   attached image.
//!
//! The gateway never retries. Generation is paid and user-paced; whether a
//! regeneration is appropriate is decided at the call site.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod types;

// ── re-exports ───────────────────────────────────────────────────────

pub use client::{HttpOracle, Oracle};
pub use config::OracleConfig;
pub use error::{OracleError, OracleResult};
pub use gateway::Gateway;
pub use types::{MediaPayload, OracleRequest, OracleResponse};
