//! Audit log: SQLite-based operation history.
//!
//! Records every mutating credential operation (create, update, delete,
//! import) in an `audit_log` table inside the vault database.  Passwords
//! never appear in the log.
//!
//! Designed for graceful degradation: if the table can't be opened or
//! written to, operations silently continue without logging.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::cli::Cli;
use crate::errors::{Result, VaultError};

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub owner: String,
    pub record_id: Option<i64>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit table in the database at `db_path`.
    ///
    /// Returns `None` if the database can't be opened; callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(db_path: &Path) -> Option<Self> {
        let conn = Connection::open(db_path).ok()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Option<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                owner       TEXT NOT NULL,
                record_id   INTEGER,
                details     TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget: errors are logged and ignored.
    pub fn log(&self, operation: &str, owner: &str, record_id: Option<i64>, details: Option<&str>) {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        if let Err(e) = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, owner, record_id, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![now, operation, owner, record_id, details],
        ) {
            tracing::debug!(error = %e, operation, "audit write skipped");
        }
    }

    /// Query recent audit entries for one owner.
    ///
    /// - `limit`: maximum number of entries to return (most recent first).
    /// - `since`: if provided, only return entries at or after this time.
    pub fn query(
        &self,
        owner: &str,
        limit: usize,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let since = since
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Micros, true))
            .unwrap_or_default();

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, owner, record_id, details
                 FROM audit_log
                 WHERE owner = ?1 AND timestamp >= ?2
                 ORDER BY id DESC
                 LIMIT ?3",
            )
            .map_err(|e| VaultError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![owner, since, limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    owner: row.get(3)?,
                    record_id: row.get(4)?,
                    details: row.get(5)?,
                })
            })
            .map_err(|e| VaultError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| VaultError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }
}

/// Convenience helper: log an audit event using the CLI context.
///
/// Opens the audit table, logs the event, and ignores any errors.
/// Safe to call from any command; it never fails the parent operation.
pub fn log_audit(cli: &Cli, op: &str, record_id: Option<i64>, details: Option<&str>) {
    let Ok(db_path) = crate::cli::database_path(cli) else {
        return;
    };

    if let Some(audit) = AuditLog::open(&db_path) {
        audit.log(op, &cli.owner, record_id, details);
    }
}
