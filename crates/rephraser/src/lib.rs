//! # Triage Rephraser
//!
//! Optional natural-language rephrasing of a triage decision.
//!
//! The rephraser is a decorator over the deterministic rule reasoning: it asks a local
//! text-generation service for one plain sentence explaining why a label fits. It is strictly
//! best effort. [`Rephraser::rephrase`] never fails; an unreachable service, a timeout or an
//! unusable reply all collapse to `None`, and callers fall back to the rule reasoning.
//!
//! Contains:
//! - [`Rephraser`]: the capability a gateway optionally holds
//! - [`OllamaRephraser`]: implementation against an Ollama-compatible HTTP API
//! - [`clean_reason_text`]: normalisation of raw model output to a single sentence
//! - [`build_prompt`]: the fixed prompt sent to the model

mod clean;
mod ollama;
mod prompt;

pub use clean::clean_reason_text;
pub use ollama::OllamaRephraser;
pub use prompt::{build_prompt, SYSTEM_PROMPT};

use std::time::Duration;
use triage_types::{TriageLevel, Vitals};

/// Everything the rephraser sees about a case.
#[derive(Clone, Debug, PartialEq)]
pub struct RephraseRequest {
    pub level: TriageLevel,
    pub description: String,
    pub vitals: Vitals,
}

/// A best-effort source of one-sentence explanations.
#[async_trait::async_trait]
pub trait Rephraser: Send + Sync {
    /// One cleaned sentence, or `None` when no explanation is available.
    async fn rephrase(&self, request: &RephraseRequest) -> Option<String>;
}

/// Reasons a rephrase attempt produced nothing. Logged, never returned to callers of
/// [`Rephraser::rephrase`].
#[derive(Debug, thiserror::Error)]
pub enum RephraserError {
    #[error("cannot reach text-generation service at {0}")]
    Connection(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("text-generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned no usable text")]
    Empty,
}
