//! Constants used throughout the triage workspace.
//!
//! Defaults for startup configuration live here so the server, the CLI and the tests agree on
//! them.

/// Disclaimer attached to every triage response.
pub const DISCLAIMER: &str =
    "Support tool only; not a substitute for professional medical judgment.";

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8000";

/// Upper bound, and default, for the in-memory recent results listing.
pub const MAX_RECENT_CASES: usize = 20;

/// Default base URL of the local text-generation service.
pub const DEFAULT_LLM_URL: &str = "http://127.0.0.1:11434";

/// Default model asked to rephrase the reasoning.
pub const DEFAULT_LLM_MODEL: &str = "llama3.2:latest";

/// Default hard timeout for one rephrase call, in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 8;

/// Rephrase timeouts must stay within single-digit seconds.
pub const MAX_LLM_TIMEOUT_SECS: u64 = 9;

/// Lowest reported confidence.
pub const MIN_CONFIDENCE: f64 = 0.5;

/// Highest reported confidence.
pub const MAX_CONFIDENCE: f64 = 0.99;
