/// Errors raised while resolving triage configuration.
///
/// Evaluation itself has no error states; these only surface at startup.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
