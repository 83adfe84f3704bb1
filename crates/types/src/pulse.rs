/// Normalised pulse quality.
///
/// Raw pulse text is matched loosely: it is trimmed and lowercased, known synonyms are folded
/// into the canonical vocabulary, and anything else is kept verbatim as [`Pulse::Unrecognised`].
/// Unrecognised values never count as poor perfusion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pulse {
    Strong,
    Normal,
    Weak,
    /// No palpable pulse. Canonical spelling is `none`.
    Absent,
    /// Outside the vocabulary, stored lowercased and trimmed.
    Unrecognised(String),
}

impl Pulse {
    /// Normalise raw pulse text.
    ///
    /// Returns `None` when the input is missing or blank, which is treated as "no pulse data"
    /// rather than "no pulse".
    pub fn normalise(raw: Option<&str>) -> Option<Pulse> {
        let text = raw?.trim().to_lowercase();
        let pulse = match text.as_str() {
            "" => return None,
            "strong" => Pulse::Strong,
            "normal" | "ok" => Pulse::Normal,
            "weak" | "week" => Pulse::Weak,
            "none" | "absent" | "no" => Pulse::Absent,
            _ => Pulse::Unrecognised(text),
        };
        Some(pulse)
    }

    /// Canonical text form. Unrecognised values are returned as stored.
    pub fn as_str(&self) -> &str {
        match self {
            Pulse::Strong => "strong",
            Pulse::Normal => "normal",
            Pulse::Weak => "weak",
            Pulse::Absent => "none",
            Pulse::Unrecognised(text) => text,
        }
    }

    /// Whether the value is part of the canonical vocabulary.
    pub fn is_canonical(&self) -> bool {
        !matches!(self, Pulse::Unrecognised(_))
    }

    /// Weak or absent pulse, the perfusion signal used by START.
    pub fn indicates_poor_perfusion(&self) -> bool {
        matches!(self, Pulse::Weak | Pulse::Absent)
    }
}

impl std::fmt::Display for Pulse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
