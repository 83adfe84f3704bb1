//! SQLite-backed case log implementation.

use crate::{CaseLogError, CaseLogResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use triage_types::{TriageLevel, Vitals};
use uuid::Uuid;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cases(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id TEXT NOT NULL,
    ts TEXT NOT NULL,
    description TEXT NOT NULL,
    resp_rate REAL,
    pulse TEXT,
    cap_refill TEXT,
    triage_level TEXT NOT NULL,
    reason_code TEXT NOT NULL,
    reasoning TEXT NOT NULL,
    confidence REAL NOT NULL
)";

const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// A triage result to append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCaseEntry {
    pub ts: DateTime<Utc>,
    pub description: String,
    pub vitals: Vitals,
    pub triage_level: TriageLevel,
    pub reason_code: String,
    pub reasoning: String,
    pub confidence: f64,
}

/// A stored entry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaseRecord {
    /// Insertion sequence number
    pub id: i64,
    pub case_id: Uuid,
    pub ts: DateTime<Utc>,
    pub description: String,
    pub resp_rate: Option<f64>,
    pub pulse: Option<String>,
    /// Raw capillary refill as supplied, rendered as text
    pub cap_refill: Option<String>,
    pub triage_level: TriageLevel,
    pub reason_code: String,
    pub reasoning: String,
    pub confidence: f64,
}

/// Raw column values before conversion.
struct StoredRow {
    id: i64,
    case_id: String,
    ts: String,
    description: String,
    resp_rate: Option<f64>,
    pulse: Option<String>,
    cap_refill: Option<String>,
    triage_level: String,
    reason_code: String,
    reasoning: String,
    confidence: f64,
}

/// Append-mostly log of triage results.
///
/// Safe to share between threads; writes are serialised on one connection.
#[derive(Debug)]
pub struct CaseLog {
    conn: Mutex<Connection>,
}

impl CaseLog {
    /// Open (creating if necessary) a log at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CaseLogError::Database`] if the file cannot be opened or the table cannot be
    /// created.
    pub fn open(path: &Path) -> CaseLogResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        tracing::debug!("opened case log at {}", path.display());
        Self::with_connection(conn)
    }

    /// Open a log that lives only as long as the returned value.
    pub fn in_memory() -> CaseLogResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> CaseLogResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Append an entry and return its generated case identifier.
    pub fn append(&self, entry: &NewCaseEntry) -> CaseLogResult<Uuid> {
        let case_id = Uuid::new_v4();
        let conn = self.conn.lock().map_err(|_| CaseLogError::Poisoned)?;

        conn.execute(
            "INSERT INTO cases(case_id, ts, description, resp_rate, pulse, cap_refill, \
             triage_level, reason_code, reasoning, confidence) \
             VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                case_id.to_string(),
                entry.ts.to_rfc3339(),
                entry.description,
                entry.vitals.resp_rate,
                entry.vitals.pulse,
                entry.vitals.cap_refill.as_ref().map(|c| c.to_string()),
                entry.triage_level.as_str(),
                entry.reason_code,
                entry.reasoning,
                entry.confidence,
            ],
        )?;

        Ok(case_id)
    }

    /// Up to `limit` entries, newest first.
    ///
    /// Rows that no longer decode are skipped with a warning.
    pub fn recent(&self, limit: usize) -> CaseLogResult<Vec<CaseRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.conn.lock().map_err(|_| CaseLogError::Poisoned)?;

        let mut stmt = conn.prepare(
            "SELECT id, case_id, ts, description, resp_rate, pulse, cap_refill, \
             triage_level, reason_code, reasoning, confidence \
             FROM cases ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok(StoredRow {
                id: row.get(0)?,
                case_id: row.get(1)?,
                ts: row.get(2)?,
                description: row.get(3)?,
                resp_rate: row.get(4)?,
                pulse: row.get(5)?,
                cap_refill: row.get(6)?,
                triage_level: row.get(7)?,
                reason_code: row.get(8)?,
                reasoning: row.get(9)?,
                confidence: row.get(10)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            match row?.into_record() {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("skipping case log entry: {e}"),
            }
        }
        Ok(records)
    }

    /// Total number of stored entries.
    pub fn count(&self) -> CaseLogResult<u64> {
        let conn = self.conn.lock().map_err(|_| CaseLogError::Poisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cases", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl StoredRow {
    fn into_record(self) -> CaseLogResult<CaseRecord> {
        let id = self.id;
        let corrupt = |reason: String| CaseLogError::CorruptRow { id, reason };

        let case_id = Uuid::parse_str(&self.case_id)
            .map_err(|e| corrupt(format!("case_id: {e}")))?;
        let ts = DateTime::parse_from_rfc3339(&self.ts)
            .map_err(|e| corrupt(format!("ts: {e}")))?
            .with_timezone(&Utc);
        let triage_level = self
            .triage_level
            .parse::<TriageLevel>()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(CaseRecord {
            id,
            case_id,
            ts,
            description: self.description,
            resp_rate: self.resp_rate,
            pulse: self.pulse,
            cap_refill: self.cap_refill,
            triage_level,
            reason_code: self.reason_code,
            reasoning: self.reasoning,
            confidence: self.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use triage_types::CapRefill;

    fn entry(description: &str, level: TriageLevel) -> NewCaseEntry {
        NewCaseEntry {
            ts: Utc::now(),
            description: description.into(),
            vitals: Vitals::new(Some(20.0), Some("strong"), Some(CapRefill::from("<2"))),
            triage_level: level,
            reason_code: "default-delayed".into(),
            reasoning: "Stable.".into(),
            confidence: 0.7,
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let log = CaseLog::in_memory().unwrap();
        let case_id = log.append(&entry("Open fracture", TriageLevel::Delayed)).unwrap();

        let records = log.recent(10).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.case_id, case_id);
        assert_eq!(record.description, "Open fracture");
        assert_eq!(record.resp_rate, Some(20.0));
        assert_eq!(record.pulse.as_deref(), Some("strong"));
        assert_eq!(record.cap_refill.as_deref(), Some("<2"));
        assert_eq!(record.triage_level, TriageLevel::Delayed);
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let log = CaseLog::in_memory().unwrap();
        for i in 0..5 {
            log.append(&entry(&format!("case {i}"), TriageLevel::Minor)).unwrap();
        }

        let records = log.recent(3).unwrap();
        let descriptions: Vec<_> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, ["case 4", "case 3", "case 2"]);
        assert_eq!(log.count().unwrap(), 5);
    }

    #[test]
    fn test_missing_vitals_are_stored_as_null() {
        let log = CaseLog::in_memory().unwrap();
        let mut e = entry("No vitals", TriageLevel::Delayed);
        e.vitals = Vitals::default();
        log.append(&e).unwrap();

        let record = log.recent(1).unwrap().remove(0);
        assert_eq!(record.resp_rate, None);
        assert_eq!(record.pulse, None);
        assert_eq!(record.cap_refill, None);
    }

    #[test]
    fn test_file_backed_log_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cases.db");

        {
            let log = CaseLog::open(&path).unwrap();
            log.append(&entry("first", TriageLevel::Immediate)).unwrap();
        }

        let log = CaseLog::open(&path).unwrap();
        log.append(&entry("second", TriageLevel::Expectant)).unwrap();
        let records = log.recent(10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].triage_level, TriageLevel::Expectant);
        assert_eq!(records[1].description, "first");
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_entries() {
        let log = Arc::new(CaseLog::in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        log.append(&entry(&format!("{i}-{j}"), TriageLevel::Minor))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.count().unwrap(), 80);
    }

    #[test]
    fn test_corrupt_rows_are_skipped() {
        let log = CaseLog::in_memory().unwrap();
        log.append(&entry("first", TriageLevel::Minor)).unwrap();
        log.append(&entry("second", TriageLevel::Delayed)).unwrap();
        log.append(&entry("third", TriageLevel::Immediate)).unwrap();
        log.conn
            .lock()
            .unwrap()
            .execute("UPDATE cases SET triage_level = 'Urgent' WHERE id = 2", [])
            .unwrap();

        let records = log.recent(10).unwrap();
        let descriptions: Vec<_> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, ["third", "first"]);
        assert_eq!(log.count().unwrap(), 3);
    }

    #[test]
    fn test_corrupt_row_decodes_to_error() {
        let row = StoredRow {
            id: 7,
            case_id: Uuid::new_v4().to_string(),
            ts: Utc::now().to_rfc3339(),
            description: "x".into(),
            resp_rate: None,
            pulse: None,
            cap_refill: None,
            triage_level: "Urgent".into(),
            reason_code: "default-delayed".into(),
            reasoning: "x".into(),
            confidence: 0.7,
        };
        assert!(matches!(row.into_record(), Err(CaseLogError::CorruptRow { id: 7, .. })));
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("cases.db");
        assert!(matches!(CaseLog::open(&path), Err(CaseLogError::Database(_))));
    }
}
