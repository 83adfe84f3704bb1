//! # Triage Types
//!
//! Shared vocabulary for the START triage workspace.
//!
//! Contains:
//! - [`TriageLevel`]: the closed set of four priority labels
//! - [`Pulse`]: the normalised pulse vocabulary with loose synonym matching
//! - [`CapRefill`]: raw capillary refill input and its threshold-preserving parse
//! - [`Vitals`]: the optional bundle of vital signs supplied with a case
//!
//! These types carry no decision logic; the rule table lives in `triage-core`.

mod cap_refill;
mod level;
mod pulse;
mod vitals;

pub use cap_refill::{CapRefill, CAP_REFILL_EPSILON};
pub use level::TriageLevel;
pub use pulse::Pulse;
pub use vitals::Vitals;

/// Errors raised when parsing vocabulary values from text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VocabularyError {
    /// The text is not one of the four triage labels.
    #[error("unknown triage level: {0}")]
    UnknownLevel(String),
}
