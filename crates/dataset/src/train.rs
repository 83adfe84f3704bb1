use crate::{DatasetResult, LabelledCase};
use serde::Serialize;
use std::io::Write;
use triage_core::actions::actions_for;
use triage_core::DISCLAIMER;
use triage_types::{TriageLevel, Vitals};

const SYSTEM: &str = "You are an offline emergency triage assistant following START and WHO \
Basic Emergency Care. Only immediate, non-invasive first-aid steps. No medications. No \
diagnoses. Return valid JSON with keys: triage_level, actions, reasoning, disclaimer.";

const INSTRUCTION: &str = "Follow START + WHO guidance. Output strict JSON.";

/// One instruction-tuning example.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingRow {
    pub system: &'static str,
    pub instruction: &'static str,
    pub input: String,
    /// The expected answer, itself a JSON document rendered as a string
    pub output: String,
    pub meta: TrainingMeta,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingMeta {
    pub label: TriageLevel,
}

#[derive(Serialize)]
struct TrainingOutput<'a> {
    triage_level: TriageLevel,
    actions: &'a [&'a str],
    reasoning: &'a str,
    disclaimer: &'a str,
}

/// Training row for `case`, or `None` if it has no valid expected label.
pub fn training_row(case: &LabelledCase) -> DatasetResult<Option<TrainingRow>> {
    let Some(label) = case.expected_level() else {
        return Ok(None);
    };

    let output = TrainingOutput {
        triage_level: label,
        actions: actions_for(label),
        reasoning: label_reasoning(label, &case.to_vitals()),
        disclaimer: DISCLAIMER,
    };

    Ok(Some(TrainingRow {
        system: SYSTEM,
        instruction: INSTRUCTION,
        input: format!(
            "Triage this case.\nDescription: {}\nVitals: {}",
            case.description,
            case.vitals_json()
        ),
        output: serde_json::to_string(&output)?,
        meta: TrainingMeta { label },
    }))
}

/// Write one JSON line per labelled case and return how many were written.
///
/// Cases without a valid label are skipped with a warning.
pub fn write_training_jsonl<W: Write>(cases: &[LabelledCase], mut out: W) -> DatasetResult<usize> {
    let mut written = 0;

    for (index, case) in cases.iter().enumerate() {
        match training_row(case)? {
            Some(row) => {
                serde_json::to_writer(&mut out, &row)?;
                out.write_all(b"\n")?;
                written += 1;
            }
            None => tracing::warn!(
                "skipping case {index}: invalid label {:?}",
                case.expected_triage
            ),
        }
    }

    out.flush()?;
    Ok(written)
}

/// Justification for the expected label, derived from the label and the recorded vitals.
fn label_reasoning(label: TriageLevel, vitals: &Vitals) -> &'static str {
    match label {
        TriageLevel::Immediate => {
            if vitals.resp_rate().is_some_and(|rr| rr > 30.0) {
                "Respiratory rate above 30/min triggers Immediate."
            } else if vitals.pulse().is_some_and(|p| p.indicates_poor_perfusion()) {
                "Poor perfusion (weak or absent pulse) triggers Immediate."
            } else if vitals.cap_refill_seconds().is_some_and(|secs| secs > 2.0) {
                "Capillary refill over 2 seconds triggers Immediate."
            } else {
                "Altered mental status or another red flag triggers Immediate."
            }
        }
        TriageLevel::Delayed => "Injured with stable vitals and following commands: Delayed.",
        TriageLevel::Minor => "Walking with stable vitals qualifies as Minor.",
        TriageLevel::Expectant => "No breathing after airway repositioning, or no breathing and no pulse: Expectant.",
    }
}
