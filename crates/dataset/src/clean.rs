use crate::LabelledCase;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use triage_types::Pulse;

const VITAL_KEYS: [&str; 3] = ["resp_rate", "pulse", "cap_refill"];

static RR_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bRR\s*([0-9]+)\b").expect("valid regex"));

/// Why a case was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    InvalidLabel,
    MissingVitalField,
    RrMismatch { text: u64, vitals: i64 },
    Duplicate,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidLabel => f.write_str("invalid label"),
            RejectReason::MissingVitalField => f.write_str("missing vital field"),
            RejectReason::RrMismatch { text, vitals } => {
                write!(f, "RR mismatch (text={text}, vitals={vitals})")
            }
            RejectReason::Duplicate => f.write_str("duplicate"),
        }
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rejected {
    pub case: LabelledCase,
    pub reasons: Vec<RejectReason>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CleanReport {
    pub clean: Vec<LabelledCase>,
    pub rejects: Vec<Rejected>,
}

impl CleanReport {
    pub fn total(&self) -> usize {
        self.clean.len() + self.rejects.len()
    }
}

/// Normalise pulses and split `cases` into clean records and rejects.
///
/// Each case is checked once, in input order, for: a label outside the four canonical names,
/// a missing `resp_rate`/`pulse`/`cap_refill` key, an `RR <n>` mention in the text that
/// disagrees with an integral `resp_rate`, and an exact repeat of an earlier case. The first
/// occurrence of a repeated case is kept.
pub fn clean_cases(cases: Vec<LabelledCase>) -> CleanReport {
    let mut report = CleanReport::default();
    let mut seen = HashSet::new();

    for mut case in cases {
        normalise_pulse(&mut case);

        let mut reasons = Vec::new();

        if case.expected_level().is_none() {
            reasons.push(RejectReason::InvalidLabel);
        }

        if VITAL_KEYS.iter().any(|key| !case.vitals.contains_key(*key)) {
            reasons.push(RejectReason::MissingVitalField);
        }

        if let Some(mismatch) = rr_mismatch(&case) {
            reasons.push(mismatch);
        }

        if !seen.insert(content_hash(&case)) {
            reasons.push(RejectReason::Duplicate);
        }

        if reasons.is_empty() {
            report.clean.push(case);
        } else {
            report.rejects.push(Rejected { case, reasons });
        }
    }

    tracing::info!(
        "cleaned {} cases: {} clean, {} rejected",
        report.total(),
        report.clean.len(),
        report.rejects.len()
    );
    report
}

/// Rewrite known pulse aliases to their canonical word; other strings are left as given.
fn normalise_pulse(case: &mut LabelledCase) {
    if let Some(Value::String(raw)) = case.vitals.get_mut("pulse") {
        match Pulse::normalise(Some(raw.as_str())) {
            Some(pulse) if pulse.is_canonical() => *raw = pulse.as_str().to_string(),
            Some(_) => *raw = raw.trim().to_lowercase(),
            None => {}
        }
    }
}

fn rr_mismatch(case: &LabelledCase) -> Option<RejectReason> {
    let text = RR_IN_TEXT
        .captures(&case.description)
        .and_then(|caps| caps[1].parse::<u64>().ok())?;
    let vitals = case.vitals.get("resp_rate")?.as_i64()?;

    if i64::try_from(text).map_or(true, |t| t != vitals) {
        Some(RejectReason::RrMismatch { text, vitals })
    } else {
        None
    }
}

/// SHA-256 over the normalised description, vitals and label.
fn content_hash(case: &LabelledCase) -> String {
    let render = |key: &str| {
        case.vitals
            .get(key)
            .map_or_else(|| "null".to_string(), |v| v.to_string().to_lowercase())
    };

    let key = [
        case.description.trim().to_lowercase(),
        render("resp_rate"),
        render("pulse"),
        render("cap_refill"),
        case.expected_triage.clone().unwrap_or_default(),
    ]
    .join("|");

    hex::encode(Sha256::digest(key.as_bytes()))
}
