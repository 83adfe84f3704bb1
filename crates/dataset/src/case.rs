use crate::{DatasetError, DatasetResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use triage_types::{CapRefill, TriageLevel, Vitals};

/// One record of a labelled corpus.
///
/// Vitals are kept as the raw JSON object so that cleaning can tell a missing key from a null
/// value and so that records round-trip without losing unknown fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelledCase {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vitals: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_triage: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl LabelledCase {
    /// A record with all three vital keys present.
    pub fn new(
        description: impl Into<String>,
        resp_rate: Value,
        pulse: Value,
        cap_refill: Value,
        label: TriageLevel,
    ) -> Self {
        let mut vitals = Map::new();
        vitals.insert("resp_rate".into(), resp_rate);
        vitals.insert("pulse".into(), pulse);
        vitals.insert("cap_refill".into(), cap_refill);

        Self {
            description: description.into(),
            vitals,
            expected_triage: Some(label.as_str().to_string()),
        }
    }

    /// The expected label if it is one of the four canonical names.
    pub fn expected_level(&self) -> Option<TriageLevel> {
        self.expected_triage.as_deref()?.parse().ok()
    }

    /// Typed vitals for the engine. Values of an unexpected JSON type read as missing.
    pub fn to_vitals(&self) -> Vitals {
        let resp_rate = match self.vitals.get("resp_rate") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        let pulse = match self.vitals.get("pulse") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        let cap_refill = match self.vitals.get("cap_refill") {
            Some(Value::Number(n)) => n.as_f64().map(CapRefill::Seconds),
            Some(Value::String(s)) => Some(CapRefill::Text(s.clone())),
            _ => None,
        };

        Vitals {
            resp_rate,
            pulse,
            cap_refill,
        }
    }

    /// Vitals object as compact JSON, for prompts and training inputs.
    pub(crate) fn vitals_json(&self) -> String {
        json!(self.vitals).to_string()
    }
}

/// Read a corpus from `path`.
///
/// The file may hold a JSON array of cases or one JSON object per line; blank lines are
/// skipped.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] if the file cannot be read, or [`DatasetError::Schema`] naming
/// the line and field path of the first record that does not match the case schema.
pub fn load_cases(path: &Path) -> DatasetResult<Vec<LabelledCase>> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let cases = if text.trim_start().starts_with('[') {
        parse(&text, path.display().to_string())?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| parse(line, format!("{} line {}", path.display(), idx + 1)))
            .collect::<DatasetResult<Vec<LabelledCase>>>()?
    };

    tracing::info!("loaded {} cases from {}", cases.len(), path.display());
    Ok(cases)
}

fn parse<T: serde::de::DeserializeOwned>(text: &str, location: String) -> DatasetResult<T> {
    let deserializer = &mut serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        DatasetError::Schema {
            location,
            path,
            message: err.into_inner().to_string(),
        }
    })
}

/// Write `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> DatasetResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DatasetError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut file = fs::File::create(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    Ok(())
}
