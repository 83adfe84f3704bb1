//! # Triage Core
//!
//! START (Simple Triage And Rapid Treatment) decision logic.
//!
//! This crate contains the pure classification engine and the deterministic pieces derived
//! from its result:
//! - [`engine`]: normalisation, signal extraction and the ordered rule table
//! - [`phrases`]: the keyword sets matched against free text
//! - [`actions`]: recommended first-aid actions per level
//! - [`TriageService`]: assessment facade adding actions, confidence and rule reasoning
//!
//! **No I/O**: HTTP, persistence and the language-model rephraser belong in `api-rest`,
//! `triage-caselog` and `triage-rephraser`.

pub mod actions;
pub mod config;
pub mod constants;
pub mod engine;
mod error;
pub mod phrases;
mod reason;

pub use config::{CoreConfig, RephraserSettings};
pub use constants::{DISCLAIMER, MAX_RECENT_CASES};
pub use engine::{evaluate, triage, Case, TriageDecision};
pub use error::{TriageError, TriageResult};
pub use reason::ReasonCode;
pub use triage_types::{CapRefill, Pulse, TriageLevel, Vitals};

use constants::{MAX_CONFIDENCE, MIN_CONFIDENCE};
use serde::Serialize;

const MISSING_RESP_RATE_PENALTY: f64 = 0.03;
const MISSING_PULSE_PENALTY: f64 = 0.03;
const MISSING_CAP_REFILL_PENALTY: f64 = 0.02;

/// Deterministic assessment of one case.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Assessment {
    pub decision: TriageDecision,
    pub actions: &'static [&'static str],
    /// In `[0.5, 0.99]`.
    pub confidence: f64,
    pub rule_reasoning: &'static str,
}

/// Triage operations with no API concerns.
#[derive(Default, Clone, Copy, Debug)]
pub struct TriageService;

impl TriageService {
    /// Creates a new instance of TriageService.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `case` and attach actions, confidence and the rule-based justification.
    pub fn assess(&self, case: &Case) -> Assessment {
        let decision = evaluate(case);
        tracing::debug!(
            level = %decision.level,
            reason = %decision.reason,
            "triage decision"
        );

        Assessment {
            decision,
            actions: actions::actions_for(decision.level),
            confidence: confidence(decision.reason, &case.vitals),
            rule_reasoning: decision.reason.rule_reasoning(),
        }
    }
}

/// Confidence score for a decision.
///
/// Starts from the reason's base score, subtracts a small penalty for each missing vital and
/// clamps the result to `[0.5, 0.99]`. A blank pulse counts as missing.
pub fn confidence(reason: ReasonCode, vitals: &Vitals) -> f64 {
    let mut score = reason.base_confidence();

    if vitals.resp_rate.is_none() {
        score -= MISSING_RESP_RATE_PENALTY;
    }
    if vitals.pulse.as_deref().map_or(true, |p| p.trim().is_empty()) {
        score -= MISSING_PULSE_PENALTY;
    }
    if vitals.cap_refill.is_none() {
        score -= MISSING_CAP_REFILL_PENALTY;
    }

    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
