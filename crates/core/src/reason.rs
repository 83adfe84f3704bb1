use serde::{Deserialize, Serialize};

/// The rule that produced a triage label.
///
/// Downstream code uses this to render the rule-based justification and to pick a base
/// confidence without re-deriving the decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasonCode {
    NoBreathingNoPulse,
    ApneaDespiteAirway,
    #[serde(rename = "rr-over-30")]
    RrOver30,
    #[serde(rename = "cap-refill-over-2")]
    CapRefillOver2,
    PoorPerfusionPulse,
    AlteredMentalStatus,
    SevereBleeding,
    BreathingAfterAirway,
    ApneaAirwayAssumed,
    Ambulatory,
    DefaultDelayed,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 11] = [
        ReasonCode::NoBreathingNoPulse,
        ReasonCode::ApneaDespiteAirway,
        ReasonCode::RrOver30,
        ReasonCode::CapRefillOver2,
        ReasonCode::PoorPerfusionPulse,
        ReasonCode::AlteredMentalStatus,
        ReasonCode::SevereBleeding,
        ReasonCode::BreathingAfterAirway,
        ReasonCode::ApneaAirwayAssumed,
        ReasonCode::Ambulatory,
        ReasonCode::DefaultDelayed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::NoBreathingNoPulse => "no-breathing-no-pulse",
            ReasonCode::ApneaDespiteAirway => "apnea-despite-airway",
            ReasonCode::RrOver30 => "rr-over-30",
            ReasonCode::CapRefillOver2 => "cap-refill-over-2",
            ReasonCode::PoorPerfusionPulse => "poor-perfusion-pulse",
            ReasonCode::AlteredMentalStatus => "altered-mental-status",
            ReasonCode::SevereBleeding => "severe-bleeding",
            ReasonCode::BreathingAfterAirway => "breathing-after-airway",
            ReasonCode::ApneaAirwayAssumed => "apnea-airway-assumed",
            ReasonCode::Ambulatory => "ambulatory",
            ReasonCode::DefaultDelayed => "default-delayed",
        }
    }

    /// Fixed one-sentence justification used when no rephrased reasoning is available.
    pub fn rule_reasoning(&self) -> &'static str {
        match self {
            ReasonCode::NoBreathingNoPulse => {
                "No breathing and no pulse indicate non-survivable status; allocate resources to salvageable patients."
            }
            ReasonCode::ApneaDespiteAirway => {
                "Apnea persisting after the airway was opened indicates non-survivable status."
            }
            ReasonCode::RrOver30 => "Respiratory rate above 30/min indicates respiratory compromise.",
            ReasonCode::CapRefillOver2 => {
                "Capillary refill over 2 seconds indicates poor perfusion."
            }
            ReasonCode::PoorPerfusionPulse => {
                "Weak or absent radial pulse indicates poor perfusion."
            }
            ReasonCode::AlteredMentalStatus => {
                "Unresponsive or unable to follow commands indicates altered mental status."
            }
            ReasonCode::SevereBleeding => {
                "Severe or uncontrolled bleeding is an immediate threat to life."
            }
            ReasonCode::BreathingAfterAirway => {
                "Breathing returned only after the airway was opened; the airway needs continuous support."
            }
            ReasonCode::ApneaAirwayAssumed => {
                "Breathing absent without a confirmed pulseless state; treat as immediate after airway positioning."
            }
            ReasonCode::Ambulatory => {
                "Ambulatory with stable vitals suggests minor injuries."
            }
            ReasonCode::DefaultDelayed => {
                "Injured but stable and following commands; treatment can be delayed."
            }
        }
    }

    /// Confidence before penalties for missing vitals.
    pub fn base_confidence(&self) -> f64 {
        match self {
            ReasonCode::NoBreathingNoPulse => 0.98,
            ReasonCode::ApneaDespiteAirway => 0.95,
            ReasonCode::RrOver30 => 0.92,
            ReasonCode::Ambulatory => 0.90,
            ReasonCode::CapRefillOver2 => 0.88,
            ReasonCode::PoorPerfusionPulse
            | ReasonCode::AlteredMentalStatus
            | ReasonCode::SevereBleeding => 0.84,
            ReasonCode::BreathingAfterAirway | ReasonCode::ApneaAirwayAssumed => 0.80,
            ReasonCode::DefaultDelayed => 0.70,
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
