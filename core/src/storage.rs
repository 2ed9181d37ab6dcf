//! Append-only report persistence over SQLite. Each terminal analysis writes
//! exactly one self-contained row; rows are never mutated afterward.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::extraction::SafeMetadata;
use crate::orchestrator::AnalysisStatus;
use crate::report::Report;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    status TEXT NOT NULL,
    metadata TEXT,
    report_json TEXT,
    latency_ms INTEGER,
    model_version TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)";

/// A persisted analysis record
#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub id: i64,
    pub status: String,
    pub metadata: SafeMetadata,
    pub report: Option<Report>,
    pub latency_ms: u64,
    pub model_version: String,
    pub created_at: String,
}

/// Handle to the report store. Cheap to share behind an `Arc`; concurrent
/// writers serialize on the connection mutex, and every write is a single
/// self-contained insert.
pub struct ReportStore {
    conn: Mutex<Connection>,
}

impl ReportStore {
    /// Opens (creating if needed) the store at the given path and ensures
    /// the schema exists. Safe to call repeatedly.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    /// In-memory store, primarily for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Inserts one terminal record and returns its id.
    ///
    /// `report` is `None` only for `failed` terminals, where generation
    /// produced nothing worth keeping.
    pub fn save(
        &self,
        status: AnalysisStatus,
        metadata: &SafeMetadata,
        report: Option<&Report>,
        latency_ms: u64,
        model_version: &str,
    ) -> Result<i64> {
        let metadata_json = serde_json::to_string(metadata)
            .map_err(|e| crate::error::RadscribeError::Internal(e.to_string()))?;
        let report_json = report
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| crate::error::RadscribeError::Internal(e.to_string()))?;

        let conn = self.conn.lock().expect("report store mutex poisoned");
        conn.execute(
            "INSERT INTO reports (status, metadata, report_json, latency_ms, model_version)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                status.as_str(),
                metadata_json,
                report_json,
                latency_ms as i64,
                model_version
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetches a record by id; `None` when absent
    pub fn get(&self, id: i64) -> Result<Option<ReportRecord>> {
        let conn = self.conn.lock().expect("report store mutex poisoned");
        let row = conn
            .query_row(
                "SELECT id, status, metadata, report_json, latency_ms, model_version, created_at
                 FROM reports WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, status, metadata, report_json, latency_ms, model_version, created_at)) = row
        else {
            return Ok(None);
        };

        let metadata = metadata
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| crate::error::RadscribeError::Internal(e.to_string()))?
            .unwrap_or_default();
        let report = report_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| crate::error::RadscribeError::Internal(e.to_string()))?;

        Ok(Some(ReportRecord {
            id,
            status,
            metadata,
            report,
            latency_ms: latency_ms.max(0) as u64,
            model_version: model_version.unwrap_or_default(),
            created_at,
        }))
    }
}
