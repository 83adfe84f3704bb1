//! Runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the gateway. The helpers
//! here take the raw `Option<String>` read from the environment rather than reading it
//! themselves, so request handling and tests never depend on process-wide environment state.

use crate::constants::{
    DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_LLM_URL, MAX_LLM_TIMEOUT_SECS,
    MAX_RECENT_CASES,
};
use crate::{TriageError, TriageResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection settings for the optional explanation rephraser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RephraserSettings {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for RephraserSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_URL.into(),
            model: DEFAULT_LLM_MODEL.into(),
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    recent_capacity: usize,
    case_db_path: Option<PathBuf>,
    rephraser: Option<RephraserSettings>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidInput`] if `recent_capacity` is zero or above
    /// [`MAX_RECENT_CASES`], or if the rephraser base URL or model is blank.
    pub fn new(
        recent_capacity: usize,
        case_db_path: Option<PathBuf>,
        rephraser: Option<RephraserSettings>,
    ) -> TriageResult<Self> {
        if recent_capacity == 0 || recent_capacity > MAX_RECENT_CASES {
            return Err(TriageError::InvalidInput(format!(
                "recent_capacity must be between 1 and {MAX_RECENT_CASES}"
            )));
        }

        if let Some(settings) = &rephraser {
            if settings.base_url.trim().is_empty() {
                return Err(TriageError::InvalidInput(
                    "rephraser base_url cannot be empty".into(),
                ));
            }
            if settings.model.trim().is_empty() {
                return Err(TriageError::InvalidInput(
                    "rephraser model cannot be empty".into(),
                ));
            }
        }

        Ok(Self {
            recent_capacity,
            case_db_path,
            rephraser,
        })
    }

    pub fn recent_capacity(&self) -> usize {
        self.recent_capacity
    }

    pub fn case_db_path(&self) -> Option<&Path> {
        self.case_db_path.as_deref()
    }

    pub fn rephraser(&self) -> Option<&RephraserSettings> {
        self.rephraser.as_ref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            recent_capacity: MAX_RECENT_CASES,
            case_db_path: None,
            rephraser: Some(RephraserSettings::default()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the recent-results capacity. Missing or blank means [`MAX_RECENT_CASES`].
pub fn recent_capacity_from_env_value(value: Option<String>) -> TriageResult<usize> {
    let Some(raw) = non_blank(value) else {
        return Ok(MAX_RECENT_CASES);
    };

    let parsed = raw
        .parse::<usize>()
        .map_err(|e| TriageError::InvalidSetting {
            name: "TRIAGE_RECENT_CASES",
            value: raw.clone(),
            reason: e.to_string(),
        })?;

    if parsed == 0 || parsed > MAX_RECENT_CASES {
        return Err(TriageError::InvalidSetting {
            name: "TRIAGE_RECENT_CASES",
            value: raw,
            reason: format!("must be between 1 and {MAX_RECENT_CASES}"),
        });
    }

    Ok(parsed)
}

/// Parse the rephrase timeout in whole seconds. Missing or blank means
/// [`DEFAULT_LLM_TIMEOUT_SECS`].
pub fn timeout_from_env_value(value: Option<String>) -> TriageResult<Duration> {
    let Some(raw) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS));
    };

    let secs = raw.parse::<u64>().map_err(|e| TriageError::InvalidSetting {
        name: "TRIAGE_LLM_TIMEOUT_SECS",
        value: raw.clone(),
        reason: e.to_string(),
    })?;

    if secs == 0 || secs > MAX_LLM_TIMEOUT_SECS {
        return Err(TriageError::InvalidSetting {
            name: "TRIAGE_LLM_TIMEOUT_SECS",
            value: raw,
            reason: format!("must be between 1 and {MAX_LLM_TIMEOUT_SECS}"),
        });
    }

    Ok(Duration::from_secs(secs))
}

/// Parse a boolean switch. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn flag_from_env_value(
    name: &'static str,
    value: Option<String>,
    default: bool,
) -> TriageResult<bool> {
    let Some(raw) = non_blank(value) else {
        return Ok(default);
    };

    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(TriageError::InvalidSetting {
            name,
            value: raw,
            reason: "expected a boolean".into(),
        }),
    }
}

/// Optional path; blank means unset.
pub fn path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    non_blank(value).map(PathBuf::from)
}

/// Build rephraser settings from raw values, or `None` when disabled.
pub fn rephraser_from_env_values(
    enabled: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<String>,
) -> TriageResult<Option<RephraserSettings>> {
    if !flag_from_env_value("TRIAGE_LLM_ENABLED", enabled, true)? {
        return Ok(None);
    }

    Ok(Some(RephraserSettings {
        base_url: non_blank(base_url).unwrap_or_else(|| DEFAULT_LLM_URL.into()),
        model: non_blank(model).unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
        timeout: timeout_from_env_value(timeout_secs)?,
    }))
}
