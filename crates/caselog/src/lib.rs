//! Triage Case Log
//!
//! Append-mostly audit trail of triage requests and the results returned for them.
//!
//! ## Design Principles
//!
//! - The log is advisory: it is never consulted when triaging and a write failure must not fail
//!   the request that produced it
//! - Entries are only appended; earlier rows are never rewritten
//! - Concurrent writers share one SQLite connection behind a mutex
//! - Listing returns the newest entries first
//!
//! ## Storage Layout
//!
//! A single SQLite table:
//!
//! ```text
//! cases(id, case_id, ts, description, resp_rate, pulse, cap_refill,
//!       triage_level, reason_code, reasoning, confidence)
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use triage_caselog::CaseLog;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let log = CaseLog::open(Path::new("triage.db"))?;
//! for record in log.recent(20)? {
//!     println!("{} {} {}", record.ts, record.triage_level, record.description);
//! }
//! # Ok(())
//! # }
//! ```

mod log;

pub use log::{CaseLog, CaseRecord, NewCaseEntry};

/// Errors that can occur while reading or writing the case log.
#[derive(Debug, thiserror::Error)]
pub enum CaseLogError {
    /// SQLite reported an error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be converted back into a record
    #[error("corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    /// Another writer panicked while holding the connection
    #[error("case log connection lock poisoned")]
    Poisoned,
}

pub type CaseLogResult<T> = Result<T, CaseLogError>;
