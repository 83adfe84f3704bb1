use crate::LabelledCase;
use serde::Serialize;
use triage_core::{Case, ReasonCode, TriageService};
use triage_types::TriageLevel;

/// A labelled case the engine disagreed with.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mismatch {
    /// Position in the evaluated slice
    pub index: usize,
    pub description: String,
    pub expected: TriageLevel,
    pub predicted: TriageLevel,
    pub reason: ReasonCode,
}

/// Per-label counts over the cases expected to carry that label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelTally {
    pub level: TriageLevel,
    pub expected: usize,
    pub correct: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    /// Cases with a valid expected label
    pub scored: usize,
    pub correct: usize,
    /// Cases skipped because their label is missing or invalid
    pub skipped: usize,
    pub per_level: Vec<LevelTally>,
    pub mismatches: Vec<Mismatch>,
}

impl Evaluation {
    /// Fraction of scored cases the engine labelled as expected; 0 when nothing was scored.
    pub fn accuracy(&self) -> f64 {
        if self.scored == 0 {
            0.0
        } else {
            self.correct as f64 / self.scored as f64
        }
    }
}

/// Run the rule engine over `cases` and compare with their expected labels.
pub fn evaluate_cases(cases: &[LabelledCase]) -> Evaluation {
    let service = TriageService::new();
    let mut per_level: Vec<LevelTally> = TriageLevel::ALL
        .iter()
        .map(|&level| LevelTally {
            level,
            expected: 0,
            correct: 0,
        })
        .collect();
    let mut evaluation = Evaluation {
        scored: 0,
        correct: 0,
        skipped: 0,
        per_level: Vec::new(),
        mismatches: Vec::new(),
    };

    for (index, labelled) in cases.iter().enumerate() {
        let Some(expected) = labelled.expected_level() else {
            evaluation.skipped += 1;
            continue;
        };

        let case = Case::new(labelled.description.clone(), labelled.to_vitals());
        let decision = service.assess(&case).decision;
        let tally = per_level.iter_mut().find(|t| t.level == expected);

        evaluation.scored += 1;
        if let Some(tally) = tally {
            tally.expected += 1;
            if decision.level == expected {
                tally.correct += 1;
            }
        }

        if decision.level == expected {
            evaluation.correct += 1;
        } else {
            evaluation.mismatches.push(Mismatch {
                index,
                description: labelled.description.clone(),
                expected,
                predicted: decision.level,
                reason: decision.reason,
            });
        }
    }

    evaluation.per_level = per_level;
    tracing::info!(
        "evaluated {} cases: {} correct, {} skipped",
        evaluation.scored,
        evaluation.correct,
        evaluation.skipped
    );
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labelled(description: &str, rr: f64, pulse: &str, cap: &str, label: TriageLevel) -> LabelledCase {
        LabelledCase::new(description, json!(rr), json!(pulse), json!(cap), label)
    }

    #[test]
    fn reference_scenarios_score_perfectly() {
        let cases = vec![
            labelled("No breathing, no pulse", 0.0, "none", ">2", TriageLevel::Expectant),
            labelled("Conscious but RR 40", 40.0, "strong", "<2", TriageLevel::Immediate),
            labelled("Unconscious but breathing", 20.0, "strong", "<2", TriageLevel::Immediate),
            labelled("Ambulatory with sprained ankle", 18.0, "strong", "<2", TriageLevel::Minor),
            labelled(
                "Open arm fracture, stable, follows commands",
                20.0,
                "strong",
                "<2",
                TriageLevel::Delayed,
            ),
        ];

        let evaluation = evaluate_cases(&cases);
        assert_eq!(evaluation.scored, 5);
        assert_eq!(evaluation.correct, 5);
        assert!(evaluation.mismatches.is_empty());
        assert_eq!(evaluation.accuracy(), 1.0);
    }

    #[test]
    fn mismatches_are_reported_with_rule() {
        let cases = vec![labelled("Walking, RR 34", 34.0, "strong", "<2", TriageLevel::Minor)];
        let evaluation = evaluate_cases(&cases);

        assert_eq!(evaluation.correct, 0);
        let mismatch = &evaluation.mismatches[0];
        assert_eq!(mismatch.index, 0);
        assert_eq!(mismatch.expected, TriageLevel::Minor);
        assert_eq!(mismatch.predicted, TriageLevel::Immediate);
        assert_eq!(mismatch.reason, ReasonCode::RrOver30);

        let minor = evaluation
            .per_level
            .iter()
            .find(|t| t.level == TriageLevel::Minor)
            .unwrap();
        assert_eq!((minor.expected, minor.correct), (1, 0));
    }

    #[test]
    fn unlabelled_cases_are_skipped() {
        let mut case = labelled("Walking", 18.0, "strong", "<2", TriageLevel::Minor);
        case.expected_triage = Some("green".into());
        let evaluation = evaluate_cases(&[case]);

        assert_eq!(evaluation.skipped, 1);
        assert_eq!(evaluation.scored, 0);
        assert_eq!(evaluation.accuracy(), 0.0);
    }
}
