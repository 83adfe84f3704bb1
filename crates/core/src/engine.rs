//! START rule evaluation.
//!
//! Evaluation runs in three steps:
//! 1. [`NormalisedCase::from_case`] lowercases the text, folds pulse synonyms and parses
//!    capillary refill.
//! 2. [`Signals::extract`] reduces the normalised case to booleans, one per clinical signal.
//! 3. [`decide`] walks [`RULES`] top to bottom and returns the first rule whose predicate holds,
//!    or [`TriageDecision::DEFAULT`] when none does.
//!
//! The order of [`RULES`] is the triage policy: a later rule never overrides an earlier match.
//! Evaluation is pure and total, so it is safe to call from any thread and never fails.

use crate::phrases;
use crate::reason::ReasonCode;
use serde::{Deserialize, Serialize};
use triage_types::{Pulse, TriageLevel, Vitals};

/// Capillary refill above this many seconds indicates poor perfusion.
pub const CAP_REFILL_THRESHOLD_SECS: f64 = 2.0;

/// Respiratory rate above this many breaths per minute is immediate.
pub const RESP_RATE_THRESHOLD: f64 = 30.0;

/// A patient presentation submitted for triage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vitals: Vitals,
}

impl Case {
    pub fn new(description: impl Into<String>, vitals: Vitals) -> Self {
        Self {
            description: description.into(),
            vitals,
        }
    }
}

/// Outcome of evaluation: the label and the rule that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageDecision {
    pub level: TriageLevel,
    pub reason: ReasonCode,
}

impl TriageDecision {
    /// Returned when no rule matches.
    pub const DEFAULT: TriageDecision = TriageDecision {
        level: TriageLevel::Delayed,
        reason: ReasonCode::DefaultDelayed,
    };
}

/// Case after preprocessing.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalisedCase {
    /// Lowercased and trimmed.
    pub description: String,
    /// Finite rate, `Some(0.0)` meaning apnea.
    pub resp_rate: Option<f64>,
    pub pulse: Option<Pulse>,
    /// Seconds, comparator strings already shifted by the epsilon.
    pub cap_refill: Option<f64>,
}

impl NormalisedCase {
    pub fn from_case(case: &Case) -> Self {
        Self {
            description: case.description.trim().to_lowercase(),
            resp_rate: case.vitals.resp_rate(),
            pulse: case.vitals.pulse(),
            cap_refill: case.vitals.cap_refill_seconds(),
        }
    }
}

/// Clinical signals derived from a normalised case.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signals {
    /// Text states no breathing, or the respiratory rate is exactly zero.
    pub apnea: bool,
    /// Pulse normalised to `none`, or the text states there is no pulse.
    pub pulseless: bool,
    /// Text says apnea persisted after an airway manoeuvre and never says breathing resumed.
    pub apnea_persisted_after_airway: bool,
    /// Text says breathing resumed, and either mentions an airway manoeuvre or reports apnea.
    pub breathing_resumed_after_airway: bool,
    pub rr_over_30: bool,
    pub cap_refill_over_2: bool,
    /// Pulse normalised to `weak` or `none`.
    pub poor_perfusion_pulse: bool,
    pub altered_mental_status: bool,
    pub severe_bleeding: bool,
    /// Walking phrase present and no negated-mobility phrase.
    pub ambulatory: bool,
}

impl Signals {
    pub fn extract(case: &NormalisedCase) -> Self {
        let text = case.description.as_str();
        let breathing_resumed = phrases::BREATHING_RESUMED.matches(text);
        let after_airway = phrases::AFTER_AIRWAY.matches(text);
        let apnea = phrases::NO_BREATHING.matches(text) || case.resp_rate == Some(0.0);

        Self {
            apnea,
            pulseless: case.pulse == Some(Pulse::Absent) || phrases::NO_PULSE.matches(text),
            apnea_persisted_after_airway: after_airway && !breathing_resumed,
            breathing_resumed_after_airway: breathing_resumed && (after_airway || apnea),
            rr_over_30: case.resp_rate.is_some_and(|rr| rr > RESP_RATE_THRESHOLD),
            cap_refill_over_2: case
                .cap_refill
                .is_some_and(|secs| secs > CAP_REFILL_THRESHOLD_SECS),
            poor_perfusion_pulse: case
                .pulse
                .as_ref()
                .is_some_and(Pulse::indicates_poor_perfusion),
            altered_mental_status: phrases::ALTERED_MENTAL_STATUS.matches(text),
            severe_bleeding: phrases::SEVERE_BLEEDING.matches(text),
            ambulatory: phrases::AMBULATORY.matches(text)
                && !phrases::NOT_AMBULATORY.matches(text),
        }
    }
}

/// One row of the rule table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub level: TriageLevel,
    pub reason: ReasonCode,
    predicate: fn(&Signals) -> bool,
}

impl Rule {
    const fn new(level: TriageLevel, reason: ReasonCode, predicate: fn(&Signals) -> bool) -> Self {
        Self {
            level,
            reason,
            predicate,
        }
    }

    pub fn applies(&self, signals: &Signals) -> bool {
        (self.predicate)(signals)
    }

    pub fn decision(&self) -> TriageDecision {
        TriageDecision {
            level: self.level,
            reason: self.reason,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("level", &self.level)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

fn no_breathing_no_pulse(s: &Signals) -> bool {
    s.apnea && s.pulseless
}

fn apnea_despite_airway(s: &Signals) -> bool {
    s.apnea && s.apnea_persisted_after_airway
}

fn rr_over_30(s: &Signals) -> bool {
    s.rr_over_30
}

fn cap_refill_over_2(s: &Signals) -> bool {
    s.cap_refill_over_2
}

fn poor_perfusion_pulse(s: &Signals) -> bool {
    s.poor_perfusion_pulse
}

fn altered_mental_status(s: &Signals) -> bool {
    s.altered_mental_status
}

fn severe_bleeding(s: &Signals) -> bool {
    s.severe_bleeding
}

fn breathing_after_airway(s: &Signals) -> bool {
    s.breathing_resumed_after_airway
}

// Reached only when the pulseless and persisted-apnea rules did not fire.
fn apnea_airway_assumed(s: &Signals) -> bool {
    s.apnea
}

fn ambulatory(s: &Signals) -> bool {
    s.ambulatory
}

/// START rules, evaluated top to bottom. First match wins.
pub const RULES: [Rule; 10] = [
    Rule::new(
        TriageLevel::Expectant,
        ReasonCode::NoBreathingNoPulse,
        no_breathing_no_pulse,
    ),
    Rule::new(
        TriageLevel::Expectant,
        ReasonCode::ApneaDespiteAirway,
        apnea_despite_airway,
    ),
    Rule::new(TriageLevel::Immediate, ReasonCode::RrOver30, rr_over_30),
    Rule::new(
        TriageLevel::Immediate,
        ReasonCode::CapRefillOver2,
        cap_refill_over_2,
    ),
    Rule::new(
        TriageLevel::Immediate,
        ReasonCode::PoorPerfusionPulse,
        poor_perfusion_pulse,
    ),
    Rule::new(
        TriageLevel::Immediate,
        ReasonCode::AlteredMentalStatus,
        altered_mental_status,
    ),
    Rule::new(
        TriageLevel::Immediate,
        ReasonCode::SevereBleeding,
        severe_bleeding,
    ),
    Rule::new(
        TriageLevel::Immediate,
        ReasonCode::BreathingAfterAirway,
        breathing_after_airway,
    ),
    Rule::new(
        TriageLevel::Immediate,
        ReasonCode::ApneaAirwayAssumed,
        apnea_airway_assumed,
    ),
    Rule::new(TriageLevel::Minor, ReasonCode::Ambulatory, ambulatory),
];

/// Apply the rule table to already extracted signals.
pub fn decide(signals: &Signals) -> TriageDecision {
    RULES
        .iter()
        .find(|rule| rule.applies(signals))
        .map(Rule::decision)
        .unwrap_or(TriageDecision::DEFAULT)
}

/// Triage a case.
pub fn evaluate(case: &Case) -> TriageDecision {
    decide(&Signals::extract(&NormalisedCase::from_case(case)))
}

/// Triage from loose parts, mirroring the external call contract.
pub fn triage(description: &str, vitals: &Vitals) -> TriageDecision {
    let case = NormalisedCase {
        description: description.trim().to_lowercase(),
        resp_rate: vitals.resp_rate(),
        pulse: vitals.pulse(),
        cap_refill: vitals.cap_refill_seconds(),
    };
    decide(&Signals::extract(&case))
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_types::CapRefill;

    fn case(description: &str, rr: Option<f64>, pulse: Option<&str>, cap: Option<CapRefill>) -> Case {
        Case::new(description, Vitals::new(rr, pulse, cap))
    }

    fn level_of(c: &Case) -> TriageLevel {
        evaluate(c).level
    }

    #[test]
    fn reference_scenarios() {
        let scenarios = [
            (
                case("No breathing, no pulse", Some(0.0), Some("none"), Some(">2".into())),
                TriageLevel::Expectant,
            ),
            (
                case("Conscious but RR 40", Some(40.0), Some("strong"), Some("<2".into())),
                TriageLevel::Immediate,
            ),
            (
                case("Unconscious but breathing", Some(20.0), Some("strong"), Some("<2".into())),
                TriageLevel::Immediate,
            ),
            (
                case(
                    "Ambulatory with sprained ankle",
                    Some(18.0),
                    Some("strong"),
                    Some("<2".into()),
                ),
                TriageLevel::Minor,
            ),
            (
                case(
                    "Open arm fracture, stable, follows commands",
                    Some(20.0),
                    Some("strong"),
                    Some("<2".into()),
                ),
                TriageLevel::Delayed,
            ),
        ];

        for (c, expected) in scenarios {
            assert_eq!(level_of(&c), expected, "{}", c.description);
        }
    }

    #[test]
    fn rr_over_30_is_immediate() {
        let decision = evaluate(&case("Breathing fast", Some(31.0), Some("strong"), Some("<2".into())));
        assert_eq!(decision.level, TriageLevel::Immediate);
        assert_eq!(decision.reason, ReasonCode::RrOver30);

        let at_threshold = evaluate(&case("Breathing fast", Some(30.0), Some("strong"), Some("<2".into())));
        assert_eq!(at_threshold, TriageDecision::DEFAULT);
    }

    #[test]
    fn no_breathing_with_absent_pulse_is_expectant() {
        for pulse in ["none", "absent", "No", " NONE "] {
            let decision = evaluate(&case("Not breathing", None, Some(pulse), None));
            assert_eq!(decision.level, TriageLevel::Expectant, "{pulse}");
            assert_eq!(decision.reason, ReasonCode::NoBreathingNoPulse);
        }
    }

    #[test]
    fn no_pulse_in_text_counts_as_pulseless() {
        let decision = evaluate(&case("No breathing and pulseless", None, None, None));
        assert_eq!(decision.level, TriageLevel::Expectant);
        assert_eq!(decision.reason, ReasonCode::NoBreathingNoPulse);
    }

    #[test]
    fn no_breathing_with_pulse_or_no_vitals_assumes_airway_step() {
        let with_pulse = evaluate(&case("No breathing", None, Some("strong"), None));
        assert_eq!(with_pulse.level, TriageLevel::Immediate);
        assert_eq!(with_pulse.reason, ReasonCode::ApneaAirwayAssumed);

        let bare = evaluate(&Case::new("Patient not breathing", Vitals::default()));
        assert_eq!(bare.level, TriageLevel::Immediate);
        assert_eq!(bare.reason, ReasonCode::ApneaAirwayAssumed);
    }

    #[test]
    fn apnea_despite_airway_is_expectant_without_pulse_data() {
        for text in [
            "No breathing even after airway reposition",
            "not breathing despite airway manoeuvre",
            "Apneic despite airway",
        ] {
            let decision = evaluate(&case(text, None, None, None));
            assert_eq!(decision.level, TriageLevel::Expectant, "{text}");
            assert_eq!(decision.reason, ReasonCode::ApneaDespiteAirway, "{text}");
        }
    }

    #[test]
    fn breathing_resumed_after_airway_is_immediate() {
        let decision = evaluate(&case(
            "Not breathing until airway opened, then resumes breathing",
            None,
            Some("strong"),
            None,
        ));
        assert_eq!(decision.level, TriageLevel::Immediate);
        assert_eq!(decision.reason, ReasonCode::BreathingAfterAirway);

        let repositioned = evaluate(&case(
            "no breathing, starts breathing after airway reposition",
            Some(12.0),
            None,
            None,
        ));
        assert_eq!(repositioned.level, TriageLevel::Immediate);
        assert_eq!(repositioned.reason, ReasonCode::BreathingAfterAirway);
    }

    #[test]
    fn resumed_breathing_without_airway_context_does_not_escalate() {
        let walking = evaluate(&case(
            "Sat down to rest, then breathing normally, walking unaided",
            Some(18.0),
            Some("strong"),
            Some("<2".into()),
        ));
        assert_eq!(walking.level, TriageLevel::Minor);
        assert_eq!(walking.reason, ReasonCode::Ambulatory);

        let calmed = evaluate(&case(
            "Anxious, starts breathing slower when calmed, stable",
            Some(20.0),
            Some("strong"),
            Some("<2".into()),
        ));
        assert_eq!(calmed, TriageDecision::DEFAULT);
    }

    #[test]
    fn negated_walking_is_not_ambulatory() {
        for text in [
            "Unable to walk, leg fracture, follows commands",
            "not able to walk after fall",
            "Cannot walk, ankle deformed",
        ] {
            let decision = evaluate(&case(text, Some(20.0), Some("strong"), Some("<2".into())));
            assert_eq!(decision, TriageDecision::DEFAULT, "{text}");
        }

        let walking = evaluate(&case("Walking unaided", Some(20.0), Some("strong"), Some("<2".into())));
        assert_eq!(walking.reason, ReasonCode::Ambulatory);
    }

    #[test]
    fn zero_resp_rate_alone_is_immediate() {
        let decision = evaluate(&case("Collapsed at scene", Some(0.0), None, None));
        assert_eq!(decision.level, TriageLevel::Immediate);
        assert_eq!(decision.reason, ReasonCode::ApneaAirwayAssumed);
    }

    #[test]
    fn zero_resp_rate_with_absent_pulse_is_expectant() {
        let decision = evaluate(&case("Collapsed at scene", Some(0.0), Some("absent"), None));
        assert_eq!(decision.level, TriageLevel::Expectant);
        assert_eq!(decision.reason, ReasonCode::NoBreathingNoPulse);
    }

    #[test]
    fn absent_resp_rate_is_not_apnea() {
        let decision = evaluate(&case("Collapsed at scene", None, Some("none"), None));
        assert_eq!(decision.level, TriageLevel::Immediate);
        assert_eq!(decision.reason, ReasonCode::PoorPerfusionPulse);
    }

    #[test]
    fn cap_refill_over_two_is_immediate() {
        for cap in [CapRefill::from(">2"), CapRefill::Seconds(3.0), CapRefill::from("3s")] {
            let decision = evaluate(&case("Looks pale", Some(20.0), Some("strong"), Some(cap.clone())));
            assert_eq!(decision.reason, ReasonCode::CapRefillOver2, "{cap}");
        }
    }

    #[test]
    fn cap_refill_under_two_never_escalates() {
        for cap in [
            CapRefill::from("<2"),
            CapRefill::Seconds(1.0),
            CapRefill::Seconds(2.0),
            CapRefill::from("sluggish"),
        ] {
            let decision = evaluate(&case("Looks pale", Some(20.0), Some("strong"), Some(cap.clone())));
            assert_eq!(decision, TriageDecision::DEFAULT, "{cap}");
        }
    }

    #[test]
    fn weak_pulse_including_misspelling_is_immediate() {
        for pulse in ["weak", "Week", "none"] {
            let decision = evaluate(&case("Pale and clammy", Some(20.0), Some(pulse), Some("<2".into())));
            assert_eq!(decision.reason, ReasonCode::PoorPerfusionPulse, "{pulse}");
        }
    }

    #[test]
    fn unrecognised_pulse_does_not_escalate() {
        let decision = evaluate(&case("Bruised shin", Some(20.0), Some("thready-ish"), Some("<2".into())));
        assert_eq!(decision, TriageDecision::DEFAULT);
    }

    #[test]
    fn mental_status_and_bleeding_are_immediate() {
        let mental = evaluate(&case("40M not following commands", Some(20.0), Some("strong"), None));
        assert_eq!(mental.reason, ReasonCode::AlteredMentalStatus);

        let bleeding = evaluate(&case(
            "Heavy bleeding from forearm, responsive to voice",
            Some(28.0),
            Some("strong"),
            Some("<2".into()),
        ));
        assert_eq!(bleeding.level, TriageLevel::Immediate);
        assert_eq!(bleeding.reason, ReasonCode::SevereBleeding);
    }

    #[test]
    fn conflicting_signals_resolve_to_more_severe_level() {
        let decision = evaluate(&case("Walking but weak", Some(18.0), Some("weak"), Some("<2".into())));
        assert_eq!(decision.level, TriageLevel::Immediate);
        assert_eq!(decision.reason, ReasonCode::PoorPerfusionPulse);
    }

    #[test]
    fn immediate_reason_follows_rule_order() {
        let decision = evaluate(&case(
            "Unresponsive with heavy bleeding",
            Some(36.0),
            Some("weak"),
            Some(">2".into()),
        ));
        assert_eq!(decision.reason, ReasonCode::RrOver30);
    }

    #[test]
    fn neutral_case_without_vitals_is_delayed() {
        assert_eq!(evaluate(&Case::default()), TriageDecision::DEFAULT);
        assert_eq!(
            evaluate(&Case::new("Laceration to scalp", Vitals::default())),
            TriageDecision::DEFAULT
        );
    }

    #[test]
    fn matching_is_case_insensitive_and_trimmed() {
        let decision = evaluate(&case("   WALKING UNAIDED   ", None, None, None));
        assert_eq!(decision.level, TriageLevel::Minor);
    }

    #[test]
    fn garbage_input_still_produces_a_label() {
        let inputs = [
            case("\u{0}\u{1f600}", Some(f64::NAN), Some("???"), Some("abc".into())),
            case("", Some(f64::NEG_INFINITY), Some(""), Some(CapRefill::Seconds(f64::NAN))),
            case(&"x".repeat(10_000), Some(-5.0), None, Some("<<2".into())),
        ];
        for c in inputs {
            let level = level_of(&c);
            assert!(TriageLevel::ALL.contains(&level));
        }
    }

    #[test]
    fn evaluation_is_idempotent() {
        let c = case("Unconscious, RR 34", Some(34.0), Some("weak"), Some(">2".into()));
        assert_eq!(evaluate(&c), evaluate(&c));
    }

    #[test]
    fn triage_matches_evaluate() {
        let vitals = Vitals::new(Some(18.0), Some("strong"), Some("<2".into()));
        let description = "Walking with small cuts";
        assert_eq!(
            triage(description, &vitals),
            evaluate(&Case::new(description, vitals.clone()))
        );
    }

    #[test]
    fn rule_table_is_ordered_by_severity() {
        let rank = |level: TriageLevel| match level {
            TriageLevel::Expectant => 0,
            TriageLevel::Immediate => 1,
            TriageLevel::Minor => 2,
            TriageLevel::Delayed => 3,
        };
        assert!(RULES.windows(2).all(|w| rank(w[0].level) <= rank(w[1].level)));
        assert!(RULES.iter().all(|rule| rule.level != TriageLevel::Delayed));
    }

    #[test]
    fn default_signals_fall_through_to_delayed() {
        assert_eq!(decide(&Signals::default()), TriageDecision::DEFAULT);
    }
}
