use serde::{Deserialize, Serialize};

/// Offset applied to comparator-qualified readings so that `">2"` lands strictly above 2 and
/// `"<2"` strictly below it.
pub const CAP_REFILL_EPSILON: f64 = 0.01;

/// Units accepted after the number, longest first.
const SECONDS_SUFFIXES: [&str; 3] = ["secs", "sec", "s"];

/// Capillary refill as supplied by the caller: either seconds or a comparison string.
///
/// Deserialises from a JSON number or a JSON string without a tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapRefill {
    Seconds(f64),
    Text(String),
}

impl CapRefill {
    /// Parse into a single comparable number of seconds.
    ///
    /// Plain numbers parse directly, a leading `>` adds [`CAP_REFILL_EPSILON`], a leading `<`
    /// subtracts it. Anything unparseable, or any non-finite result, is `None` ("unknown").
    pub fn seconds(&self) -> Option<f64> {
        let value = match self {
            CapRefill::Seconds(value) => Some(*value),
            CapRefill::Text(text) => parse_text(text),
        };
        value.filter(|v| v.is_finite())
    }
}

impl From<f64> for CapRefill {
    fn from(value: f64) -> Self {
        CapRefill::Seconds(value)
    }
}

impl From<&str> for CapRefill {
    fn from(value: &str) -> Self {
        CapRefill::Text(value.to_owned())
    }
}

impl std::fmt::Display for CapRefill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapRefill::Seconds(value) => write!(f, "{value}"),
            CapRefill::Text(text) => f.write_str(text),
        }
    }
}

fn parse_text(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_lowercase();
    let text = strip_seconds_suffix(&lowered);

    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }
    if let Some(rest) = text.strip_prefix('>') {
        return rest.trim().parse::<f64>().ok().map(|v| v + CAP_REFILL_EPSILON);
    }
    if let Some(rest) = text.strip_prefix('<') {
        return rest.trim().parse::<f64>().ok().map(|v| v - CAP_REFILL_EPSILON);
    }
    None
}

fn strip_seconds_suffix(text: &str) -> &str {
    for suffix in SECONDS_SUFFIXES {
        if let Some(stripped) = text.strip_suffix(suffix) {
            return stripped.trim_end();
        }
    }
    text
}
