use crate::VocabularyError;
use serde::{Deserialize, Serialize};

/// START priority label.
///
/// The set is closed: every evaluation ends in exactly one of these values and there is no
/// "unknown" label. Serialises with the capitalised names used on the wire and in datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriageLevel {
    /// Life-threatening, treat now.
    Immediate,
    /// Serious but stable.
    Delayed,
    /// Walking wounded.
    Minor,
    /// Unlikely to survive given available resources.
    Expectant,
}

impl TriageLevel {
    /// All labels, most severe first.
    pub const ALL: [TriageLevel; 4] = [
        TriageLevel::Expectant,
        TriageLevel::Immediate,
        TriageLevel::Delayed,
        TriageLevel::Minor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriageLevel::Immediate => "Immediate",
            TriageLevel::Delayed => "Delayed",
            TriageLevel::Minor => "Minor",
            TriageLevel::Expectant => "Expectant",
        }
    }
}

impl std::fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TriageLevel {
    type Err = VocabularyError;

    /// Parses the exact wire spelling. Dataset validation relies on this being strict, so
    /// `"immediate"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TriageLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| VocabularyError::UnknownLevel(s.to_owned()))
    }
}
