//! Phrase sets matched against the normalised case description.
//!
//! Each set is plain data. Matching is substring search over text that has already been
//! lowercased and trimmed, so every phrase here must be lowercase.

/// A named list of phrases; the set matches when any phrase occurs in the text.
#[derive(Debug, Clone, Copy)]
pub struct PhraseSet {
    pub name: &'static str,
    pub phrases: &'static [&'static str],
}

impl PhraseSet {
    pub const fn new(name: &'static str, phrases: &'static [&'static str]) -> Self {
        Self { name, phrases }
    }

    /// `text` must already be normalised.
    pub fn matches(&self, text: &str) -> bool {
        self.phrases.iter().any(|phrase| text.contains(phrase))
    }
}

pub const NO_BREATHING: PhraseSet = PhraseSet::new(
    "no-breathing",
    &["no breathing", "not breathing", "apneic", "apnoeic"],
);

pub const NO_PULSE: PhraseSet = PhraseSet::new("no-pulse", &["no pulse", "pulseless"]);

/// Apnea that persisted through an airway manoeuvre.
pub const AFTER_AIRWAY: PhraseSet = PhraseSet::new(
    "after-airway",
    &[
        "after airway",
        "despite airway",
        "even after airway",
        "reposition",
    ],
);

/// Breathing came back once the airway was opened.
pub const BREATHING_RESUMED: PhraseSet = PhraseSet::new(
    "breathing-resumed",
    &[
        "then breathing",
        "resumes breathing",
        "resumed breathing",
        "breathing resumed",
        "starts breathing",
        "breathes after airway",
    ],
);

pub const ALTERED_MENTAL_STATUS: PhraseSet = PhraseSet::new(
    "altered-mental-status",
    &[
        "unresponsive",
        "not responsive",
        "not responding",
        "unconscious",
        "cannot follow commands",
        "can't follow commands",
        "doesn't follow commands",
        "does not follow commands",
        "not following commands",
    ],
);

pub const SEVERE_BLEEDING: PhraseSet = PhraseSet::new(
    "severe-bleeding",
    &[
        "severe bleeding",
        "heavy bleeding",
        "uncontrolled bleeding",
        "massive bleeding",
        "bleeding heavily",
    ],
);

pub const AMBULATORY: PhraseSet = PhraseSet::new(
    "ambulatory",
    &[
        "walking",
        "ambulatory",
        "ambulating",
        "moving independently",
        "moving on their own",
        "able to walk",
    ],
);

/// Negated mobility; cancels an ambulatory match.
pub const NOT_AMBULATORY: PhraseSet = PhraseSet::new(
    "not-ambulatory",
    &[
        "unable to walk",
        "not able to walk",
        "cannot walk",
        "can't walk",
        "not walking",
        "non-ambulatory",
        "non ambulatory",
    ],
);

/// Every phrase set, in the order the rule table first consults them.
pub const ALL: [PhraseSet; 8] = [
    NO_BREATHING,
    NO_PULSE,
    AFTER_AIRWAY,
    BREATHING_RESUMED,
    ALTERED_MENTAL_STATUS,
    SEVERE_BLEEDING,
    AMBULATORY,
    NOT_AMBULATORY,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrases_are_lowercase_and_trimmed() {
        for set in ALL {
            for phrase in set.phrases {
                assert_eq!(*phrase, phrase.trim().to_lowercase(), "{} in {}", phrase, set.name);
            }
        }
    }

    #[test]
    fn set_names_are_unique() {
        let mut names: Vec<_> = ALL.iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn matches_substrings() {
        assert!(AMBULATORY.matches("25m walking unaided with cuts"));
        assert!(NO_BREATHING.matches("not breathing even after airway reposition"));
        assert!(!SEVERE_BLEEDING.matches("bleeding controlled, speaking clearly"));
        assert!(!ALTERED_MENTAL_STATUS.matches("alert and follows commands"));
    }

    #[test]
    fn negated_walking_is_caught() {
        for text in [
            "unable to walk, leg fracture, follows commands",
            "not able to walk after fall",
            "cannot walk, ankle deformed",
            "non-ambulatory, hip pain",
        ] {
            assert!(AMBULATORY.matches(text), "{text}");
            assert!(NOT_AMBULATORY.matches(text), "{text}");
        }
        assert!(!NOT_AMBULATORY.matches("walking unaided with cuts"));
    }

    #[test]
    fn resumed_breathing_phrases_carry_no_airway_context() {
        let text = "sat down to rest, then breathing normally, walking unaided";
        assert!(BREATHING_RESUMED.matches(text));
        assert!(!AFTER_AIRWAY.matches(text));
        assert!(!NO_BREATHING.matches(text));
    }

    #[test]
    fn still_apneic_after_airway_is_not_resumed_breathing() {
        let text = "still not breathing after airway opened";
        assert!(AFTER_AIRWAY.matches(text));
        assert!(!BREATHING_RESUMED.matches(text));
    }
}
