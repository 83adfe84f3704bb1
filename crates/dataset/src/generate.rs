use crate::LabelledCase;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use triage_types::TriageLevel;

/// Seed used by the CLI when none is given.
pub const DEFAULT_SEED: u64 = 11;

const IMMEDIATE_RR_COUNT: usize = 20;
const PERFUSION_COUNT: usize = 15;
const MENTAL_STATUS_COUNT: usize = 15;
const DELAYED_COUNT: usize = 50;
const MINOR_COUNT: usize = 50;
const EXPECTANT_COUNT: usize = 50;

const FAST_RR: &[u32] = &[31, 32, 34, 36, 38, 40, 42];
const STABLE_RR: &[u32] = &[18, 20, 22, 24, 26, 28];
const MINOR_RR: &[u32] = &[18, 20, 22, 24, 26];

const FAST_BREATHING: &[&str] = &[
    "breathing fast",
    "breathing very fast",
    "breathing rapidly",
    "tachypneic",
    "gasping for air",
];
const SPEAKING: &[&str] = &[
    "speaking",
    "speaking in short phrases",
    "able to answer questions",
];
const POOR_PERFUSION: &[&str] = &[
    "weak pulse",
    "thready pulse",
    "skin pale and clammy",
    "cap refill 3 seconds",
    "signs of poor circulation",
];
const ALTERED_MENTAL: &[&str] = &[
    "unresponsive",
    "not responding",
    "unconscious",
    "cannot follow commands",
    "not following commands",
];
const STABLE_INJURY: &[&str] = &[
    "injured but stable",
    "follows commands, stable vitals",
    "bleeding controlled, speaking clearly",
    "fracture present, stable",
    "burns limited area, airway intact",
];
const ORIENTED: &[&str] = &[
    "alert and follows commands",
    "calm and responsive",
    "answers questions clearly",
];
const WALKING: &[&str] = &[
    "walking",
    "ambulatory",
    "moving independently",
    "walking unaided",
    "walking and talking",
];
const NOT_SURVIVABLE: &[&str] = &[
    "not breathing even after airway reposition",
    "no breathing and pulseless",
    "apneic despite airway",
];

const SEXES: &[&str] = &["M", "F"];

/// Deterministic synthetic corpus of 200 labelled cases.
///
/// Each group draws from its own generator seeded from `seed`, so the same seed always yields
/// the same corpus. Every description that mentions `RR <n>` agrees with its `resp_rate`.
pub fn generate_cases(seed: u64) -> Vec<LabelledCase> {
    let mut cases = Vec::with_capacity(
        IMMEDIATE_RR_COUNT
            + PERFUSION_COUNT
            + MENTAL_STATUS_COUNT
            + DELAYED_COUNT
            + MINOR_COUNT
            + EXPECTANT_COUNT,
    );

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..IMMEDIATE_RR_COUNT {
        let rr = pick(&mut rng, FAST_RR);
        let phrase = pick(&mut rng, FAST_BREATHING);
        let extra = pick(&mut rng, SPEAKING);
        let description = describe(&mut rng, &[7, 12, 25, 40, 65], phrase, Some(rr), Some(extra));
        let pulse = pick(&mut rng, &["strong", "normal"]);
        cases.push(labelled(description, rr, pulse, "<2", TriageLevel::Immediate));
    }

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    for _ in 0..PERFUSION_COUNT {
        let rr = pick(&mut rng, STABLE_RR);
        let phrase = pick(&mut rng, POOR_PERFUSION);
        let description = describe(&mut rng, &[7, 12, 25, 40, 65], phrase, Some(rr), None);
        let pulse = pick(&mut rng, &["weak", "none"]);
        cases.push(labelled(description, rr, pulse, ">2", TriageLevel::Immediate));
    }

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(2));
    for _ in 0..MENTAL_STATUS_COUNT {
        let rr = pick(&mut rng, STABLE_RR);
        let phrase = pick(&mut rng, ALTERED_MENTAL);
        let description = describe(&mut rng, &[7, 12, 25, 40, 65, 80], phrase, Some(rr), None);
        cases.push(labelled(description, rr, "strong", "<2", TriageLevel::Immediate));
    }

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(3));
    for _ in 0..DELAYED_COUNT {
        let rr = pick(&mut rng, STABLE_RR);
        let phrase = pick(&mut rng, STABLE_INJURY);
        let extra = pick(&mut rng, ORIENTED);
        let description =
            describe(&mut rng, &[12, 20, 30, 40, 50, 65], phrase, Some(rr), Some(extra));
        cases.push(labelled(description, rr, "strong", "<2", TriageLevel::Delayed));
    }

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(4));
    for _ in 0..MINOR_COUNT {
        let rr = pick(&mut rng, MINOR_RR);
        let phrase = pick(&mut rng, WALKING);
        let description =
            describe(&mut rng, &[10, 20, 30, 50], phrase, Some(rr), Some("calm and coherent"));
        cases.push(labelled(description, rr, "strong", "<2", TriageLevel::Minor));
    }

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(5));
    for _ in 0..EXPECTANT_COUNT {
        let phrase = pick(&mut rng, NOT_SURVIVABLE);
        let description = describe(&mut rng, &[50, 65, 70, 80], phrase, Some(0), None);
        cases.push(labelled(description, 0, "none", ">2", TriageLevel::Expectant));
    }

    tracing::debug!("generated {} cases from seed {seed}", cases.len());
    cases
}

fn pick<T: Copy>(rng: &mut StdRng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// `"<age><sex>, <phrase>[, RR <rr>][, <extra>]"`
fn describe(
    rng: &mut StdRng,
    ages: &[u32],
    phrase: &str,
    rr: Option<u32>,
    extra: Option<&str>,
) -> String {
    let age = pick(rng, ages);
    let sex = pick(rng, SEXES);

    let mut parts = vec![format!("{age}{sex}"), phrase.to_string()];
    if let Some(rr) = rr {
        parts.push(format!("RR {rr}"));
    }
    if let Some(extra) = extra {
        parts.push(extra.to_string());
    }
    parts.join(", ")
}

fn labelled(description: String, rr: u32, pulse: &str, cap: &str, label: TriageLevel) -> LabelledCase {
    LabelledCase::new(description, json!(rr), json!(pulse), json!(cap), label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clean_cases, evaluate_cases, RejectReason};

    #[test]
    fn corpus_has_expected_shape() {
        let cases = generate_cases(DEFAULT_SEED);
        assert_eq!(cases.len(), 200);

        let count = |level: TriageLevel| {
            cases
                .iter()
                .filter(|c| c.expected_level() == Some(level))
                .count()
        };
        assert_eq!(count(TriageLevel::Immediate), 50);
        assert_eq!(count(TriageLevel::Delayed), 50);
        assert_eq!(count(TriageLevel::Minor), 50);
        assert_eq!(count(TriageLevel::Expectant), 50);
    }

    #[test]
    fn same_seed_same_corpus() {
        assert_eq!(generate_cases(7), generate_cases(7));
        assert_ne!(generate_cases(7), generate_cases(8));
    }

    #[test]
    fn engine_agrees_with_every_generated_label() {
        let evaluation = evaluate_cases(&generate_cases(DEFAULT_SEED));
        assert_eq!(evaluation.scored, 200);
        assert!(evaluation.mismatches.is_empty(), "{:?}", evaluation.mismatches);
    }

    #[test]
    fn generated_cases_only_fail_cleaning_as_duplicates() {
        let report = clean_cases(generate_cases(DEFAULT_SEED));
        assert_eq!(report.total(), 200);
        for rejected in &report.rejects {
            assert_eq!(rejected.reasons, [RejectReason::Duplicate]);
        }
    }
}
