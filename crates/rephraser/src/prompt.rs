use triage_types::{TriageLevel, Vitals};

/// Scope statement sent as the system message on every request.
pub const SYSTEM_PROMPT: &str = "You are an emergency triage assistant working within START \
and WHO Basic Emergency Care scope. No medications and no invasive procedures. Keep to \
layperson first-aid reasoning. Return only one short explanatory sentence.";

const INSTRUCTIONS: &str = "\
Answer with ONE short, plain-English sentence (at most 22 words) explaining WHY the triage label fits.
Do NOT output JSON, lists, bullets or labels. Do NOT start with \"Reason:\".
No medications, no invasive procedures, no speculation.

Style:
- Start with the clinical signal, then the implication.
- Prefer numbers where available, e.g. \"RR 34/min (>30)\".
- Do not mention rules or START, only the clinical logic.

Examples of the expected format:
Immediate -> RR 34/min (>30) indicates respiratory compromise; prioritize immediate care.
Expectant -> Apnea with no pulse indicates non-survivable status; allocate resources to salvageable patients.
Minor -> Ambulatory with stable vitals suggests minor injuries suitable for delayed treatment.
Delayed -> Stable vitals and following commands indicate delayed priority.

Now write exactly one sentence:";

/// Build the generation prompt for one decided case.
pub fn build_prompt(level: TriageLevel, description: &str, vitals: &Vitals) -> String {
    format!(
        "{INSTRUCTIONS}\n\nLabel: {level}\nDescription: {}\nVitals: {}",
        description.trim(),
        render_vitals(vitals)
    )
}

fn render_vitals(vitals: &Vitals) -> String {
    let resp_rate = vitals
        .resp_rate()
        .map_or_else(|| "unknown".to_string(), |rr| format!("{rr}/min"));
    let pulse = vitals
        .pulse
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("unknown");
    let cap_refill = vitals
        .cap_refill
        .as_ref()
        .map_or_else(|| "unknown".to_string(), |c| c.to_string());

    format!("RR {resp_rate}, pulse {pulse}, capillary refill {cap_refill}")
}
