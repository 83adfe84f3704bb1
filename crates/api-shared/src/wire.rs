//! JSON request and response bodies.

use serde::{Deserialize, Serialize};
use triage_types::{CapRefill, TriageLevel, Vitals};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    /// Always true: triage never requires network access.
    pub offline: bool,
    pub message: String,
}

/// Vital signs as sent by a client. Every field may be omitted or null.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VitalsReq {
    /// Breaths per minute
    #[serde(default)]
    pub resp_rate: Option<f64>,
    /// One of strong, normal, weak, none (aliases ok, absent, no, week)
    #[serde(default)]
    pub pulse: Option<String>,
    /// Seconds as a number, or a comparison string such as ">2" or "<2"
    #[serde(default)]
    #[schema(value_type = Object, nullable)]
    pub cap_refill: Option<CapRefill>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageReq {
    pub description: String,
    #[serde(default)]
    pub vitals: Option<VitalsReq>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageRes {
    #[schema(value_type = String, example = "Immediate")]
    pub triage_level: TriageLevel,
    #[schema(example = "rr-over-30")]
    pub reason_code: String,
    pub actions: Vec<String>,
    pub reasoning: String,
    pub disclaimer: String,
    /// Between 0.5 and 0.99
    pub confidence: f64,
    /// RFC 3339 UTC timestamp
    pub ts: String,
    /// The request as received
    pub input: TriageReq,
}

/// One persisted case-log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryRes {
    pub id: i64,
    pub case_id: String,
    pub ts: String,
    pub description: String,
    pub resp_rate: Option<f64>,
    pub pulse: Option<String>,
    pub cap_refill: Option<String>,
    #[schema(value_type = String)]
    pub triage_level: TriageLevel,
    pub reason_code: String,
    pub reasoning: String,
    pub confidence: f64,
}

impl From<VitalsReq> for Vitals {
    fn from(req: VitalsReq) -> Self {
        Vitals {
            resp_rate: req.resp_rate,
            pulse: req.pulse,
            cap_refill: req.cap_refill,
        }
    }
}

impl TriageReq {
    /// Vitals to evaluate; an absent object means no vitals at all.
    pub fn vitals(&self) -> Vitals {
        self.vitals.clone().map(Vitals::from).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_numeric_and_text_cap_refill() {
        let req: TriageReq = serde_json::from_str(
            r#"{"description":"x","vitals":{"resp_rate":20,"pulse":"strong","cap_refill":3}}"#,
        )
        .unwrap();
        assert_eq!(req.vitals().cap_refill, Some(CapRefill::Seconds(3.0)));

        let req: TriageReq =
            serde_json::from_str(r#"{"description":"x","vitals":{"cap_refill":">2"}}"#).unwrap();
        assert_eq!(req.vitals().cap_refill, Some(CapRefill::Text(">2".into())));
        assert_eq!(req.vitals().resp_rate, None);
    }

    #[test]
    fn missing_vitals_object_means_no_vitals() {
        let req: TriageReq = serde_json::from_str(r#"{"description":"walking"}"#).unwrap();
        assert!(req.vitals().is_empty());
    }

    #[test]
    fn description_is_required() {
        let err = serde_json::from_str::<TriageReq>(r#"{"vitals":{}}"#);
        assert!(err.is_err());
    }
}
