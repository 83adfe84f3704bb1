use crate::{CapRefill, Pulse};
use serde::{Deserialize, Serialize};

/// Vital signs supplied with a case. Every field is independently optional.
///
/// `resp_rate == Some(0.0)` means apnea and is distinct from `None` (not measured).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    #[serde(default)]
    pub resp_rate: Option<f64>,
    #[serde(default)]
    pub pulse: Option<String>,
    #[serde(default)]
    pub cap_refill: Option<CapRefill>,
}

impl Vitals {
    pub fn new(
        resp_rate: Option<f64>,
        pulse: Option<&str>,
        cap_refill: Option<CapRefill>,
    ) -> Self {
        Self {
            resp_rate,
            pulse: pulse.map(str::to_owned),
            cap_refill,
        }
    }

    /// Respiratory rate if present and finite.
    pub fn resp_rate(&self) -> Option<f64> {
        self.resp_rate.filter(|rr| rr.is_finite())
    }

    /// Normalised pulse, `None` when missing or blank.
    pub fn pulse(&self) -> Option<Pulse> {
        Pulse::normalise(self.pulse.as_deref())
    }

    /// Parsed capillary refill seconds, `None` when missing or unparseable.
    pub fn cap_refill_seconds(&self) -> Option<f64> {
        self.cap_refill.as_ref().and_then(CapRefill::seconds)
    }

    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.resp_rate().is_none() && self.pulse().is_none() && self.cap_refill.is_none()
    }
}
