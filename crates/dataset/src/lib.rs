//! # Triage Dataset
//!
//! Tooling for labelled case corpora: `{description, vitals, expected_triage}` records stored as
//! a JSON array or as JSON lines.
//!
//! - [`load_cases`] reads either format
//! - [`clean_cases`] normalises pulses and separates bad records with itemised reasons
//! - [`evaluate_cases`] runs the rule engine against expected labels
//! - [`generate_cases`] builds a deterministic synthetic corpus
//! - [`write_training_jsonl`] exports instruction-tuning rows
//!
//! Nothing here panics on a malformed case; bad records are reported, not raised.

mod case;
mod clean;
mod evaluate;
mod generate;
mod train;

pub use case::{load_cases, write_json, LabelledCase};
pub use clean::{clean_cases, CleanReport, RejectReason, Rejected};
pub use evaluate::{evaluate_cases, Evaluation, LevelTally, Mismatch};
pub use generate::{generate_cases, DEFAULT_SEED};
pub use train::{training_row, write_training_jsonl, TrainingRow};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{location}: schema mismatch at {path}: {message}")]
    Schema {
        location: String,
        path: String,
        message: String,
    },

    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to serialise: {0}")]
    Serialise(#[from] serde_json::Error),
}

pub type DatasetResult<T> = Result<T, DatasetError>;
