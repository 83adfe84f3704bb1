//! Recommended first-aid actions per triage level.
//!
//! Lay-responder scope only: no medications and no invasive procedures.

use triage_types::TriageLevel;

const IMMEDIATE: &[&str] = &[
    "Open and maintain airway",
    "Control major external bleeding",
    "Position for breathing",
    "Prepare rapid transport",
    "Reassess every 2-3 minutes",
];

const DELAYED: &[&str] = &[
    "Immobilize injured limb",
    "Cold pack if swelling",
    "Reassess every 10-15 minutes",
    "Prepare for transport when possible",
];

const MINOR: &[&str] = &[
    "Clean minor wounds with clean water",
    "Apply clean dressing",
    "Provide reassurance",
    "Advise self-care and recheck if worse",
];

const EXPECTANT: &[&str] = &[
    "Prioritize comfort and dignity",
    "Monitor for return of breathing",
    "Allocate resources to salvageable patients",
    "Reassess periodically if safe",
];

/// Static action list for `level`.
pub fn actions_for(level: TriageLevel) -> &'static [&'static str] {
    match level {
        TriageLevel::Immediate => IMMEDIATE,
        TriageLevel::Delayed => DELAYED,
        TriageLevel::Minor => MINOR,
        TriageLevel::Expectant => EXPECTANT,
    }
}
