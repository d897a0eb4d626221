//! SQLite-backed credential store.
//!
//! `RecordStore` owns the database connection and the codec.  Every
//! write goes through [`RecordStore::save`], which runs the pre-persist
//! hook; reads hand back records whose password is still sealed and
//! callers reveal it on demand with [`RecordStore::reveal`].

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::RegexBuilder;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::crypto::{RevealedSecret, SecretCodec};
use crate::errors::{Result, VaultError};

use super::hooks;
use super::record::{NewRecord, RecordUpdate, RecordView, SecretField, VaultRecord};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS credentials (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        owner        TEXT NOT NULL,
        title        TEXT NOT NULL,
        username     TEXT NOT NULL,
        secret       TEXT NOT NULL,
        website      TEXT NOT NULL DEFAULT '',
        category     TEXT NOT NULL DEFAULT 'General',
        notes        TEXT NOT NULL DEFAULT '',
        last_updated TEXT NOT NULL,
        created_at   TEXT NOT NULL,
        updated_at   TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_credentials_owner_title
        ON credentials (owner, title);
    CREATE INDEX IF NOT EXISTS idx_credentials_owner_category
        ON credentials (owner, category);";

const SELECT_COLUMNS: &str = "SELECT id, owner, title, username, secret, website, category,
            notes, last_updated, created_at, updated_at
     FROM credentials";

/// The credential store.
pub struct RecordStore {
    conn: Connection,
    codec: SecretCodec,
}

impl RecordStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open (or create) the database at `path`.
    pub fn open(path: &Path, codec: SecretCodec) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Owner-only permissions on the database file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Self::from_connection(conn, codec)
    }

    /// A throwaway in-memory store.
    pub fn open_in_memory(codec: SecretCodec) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, codec)
    }

    fn from_connection(conn: Connection, codec: SecretCodec) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, codec })
    }

    pub fn codec(&self) -> &SecretCodec {
        &self.codec
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Create a record; its password is encrypted before it is written.
    pub fn create(&self, owner: &str, new: NewRecord) -> Result<VaultRecord> {
        let mut record = new.into_record(owner);
        self.save(&mut record)?;
        tracing::debug!(id = ?record.id, owner, "credential created");
        Ok(record)
    }

    /// Insert a row whose password is kept as raw plaintext.
    ///
    /// For bringing over data that predates encryption; such rows are
    /// read back through the legacy passthrough.
    pub fn import_legacy(&self, owner: &str, new: NewRecord) -> Result<VaultRecord> {
        let mut record = new.into_record(owner);
        if let SecretField::Pending(plaintext) = &record.secret {
            if plaintext.is_empty() {
                return Err(VaultError::Validation("password is required".into()));
            }
            record.secret = SecretField::Stored(plaintext.as_str().to_owned());
        }
        self.save(&mut record)?;
        tracing::debug!(id = ?record.id, owner, "legacy credential imported");
        Ok(record)
    }

    /// Validate, seal and write a record.
    ///
    /// Inserts when `record.id` is `None`, otherwise updates the row with
    /// that id belonging to `record.owner`.  On success the password
    /// field holds the persisted value.
    pub fn save(&self, record: &mut VaultRecord) -> Result<()> {
        record.normalize()?;

        // Fatal on failure: a plaintext password is never written instead.
        let sealed = hooks::seal_for_write(&self.codec, &record.secret)?;

        match record.id {
            None => {
                self.conn.execute(
                    "INSERT INTO credentials
                        (owner, title, username, secret, website, category, notes,
                         last_updated, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        record.owner,
                        record.title,
                        record.username,
                        sealed,
                        record.website,
                        record.category,
                        record.notes,
                        timestamp(&record.last_updated),
                        timestamp(&record.created_at),
                        timestamp(&record.updated_at),
                    ],
                )?;
                record.id = Some(self.conn.last_insert_rowid());
            }
            Some(id) => {
                record.updated_at = Utc::now();
                let changed = self.conn.execute(
                    "UPDATE credentials
                     SET title = ?1, username = ?2, secret = ?3, website = ?4,
                         category = ?5, notes = ?6, last_updated = ?7, updated_at = ?8
                     WHERE id = ?9 AND owner = ?10",
                    params![
                        record.title,
                        record.username,
                        sealed,
                        record.website,
                        record.category,
                        record.notes,
                        timestamp(&record.last_updated),
                        timestamp(&record.updated_at),
                        id,
                        record.owner,
                    ],
                )?;
                if changed == 0 {
                    return Err(VaultError::RecordNotFound(id));
                }
            }
        }

        record.secret = SecretField::Stored(sealed);
        Ok(())
    }

    /// Apply a partial update and save.
    ///
    /// The password is re-encrypted only when the update carries a new one.
    pub fn update(&self, owner: &str, id: i64, update: RecordUpdate) -> Result<VaultRecord> {
        let mut record = self.get(owner, id)?;
        // An update that changes nothing still counts as a touch.
        update.apply_to(&mut record);
        record.last_updated = Utc::now();
        self.save(&mut record)?;
        tracing::debug!(id, owner, "credential updated");
        Ok(record)
    }

    /// Delete a record.
    pub fn delete(&self, owner: &str, id: i64) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM credentials WHERE id = ?1 AND owner = ?2",
            params![id, owner],
        )?;
        if removed == 0 {
            return Err(VaultError::RecordNotFound(id));
        }
        tracing::debug!(id, owner, "credential deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetch one record.
    pub fn get(&self, owner: &str, id: i64) -> Result<VaultRecord> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1 AND owner = ?2");
        self.conn
            .query_row(&sql, params![id, owner], record_from_row)
            .optional()?
            .ok_or(VaultError::RecordNotFound(id))
    }

    /// All of an owner's records, most recently updated first.
    pub fn list(&self, owner: &str) -> Result<Vec<VaultRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE owner = ?1 ORDER BY last_updated DESC, id DESC");
        self.query(&sql, params![owner])
    }

    /// An owner's records in one category, most recently updated first.
    pub fn list_by_category(&self, owner: &str, category: &str) -> Result<Vec<VaultRecord>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE owner = ?1 AND category = ?2
             ORDER BY last_updated DESC, id DESC"
        );
        self.query(&sql, params![owner, category])
    }

    /// Case-insensitive substring search over title, username, website
    /// and notes.  The password is never searched.
    pub fn search(&self, owner: &str, query: &str) -> Result<Vec<VaultRecord>> {
        let pattern = RegexBuilder::new(&regex::escape(query.trim()))
            .case_insensitive(true)
            .build()
            .map_err(|e| VaultError::CommandFailed(format!("invalid search query: {e}")))?;

        let matches = self
            .list(owner)?
            .into_iter()
            .filter(|r| {
                [&r.title, &r.username, &r.website, &r.notes]
                    .iter()
                    .any(|field| pattern.is_match(field))
            })
            .collect();
        Ok(matches)
    }

    /// Number of records an owner has.
    pub fn count(&self, owner: &str) -> Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM credentials WHERE owner = ?1",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// The password column exactly as persisted.
    pub fn raw_secret(&self, owner: &str, id: i64) -> Result<String> {
        self.conn
            .query_row(
                "SELECT secret FROM credentials WHERE id = ?1 AND owner = ?2",
                params![id, owner],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(VaultError::RecordNotFound(id))
    }

    // ------------------------------------------------------------------
    // Reveal
    // ------------------------------------------------------------------

    /// Reveal a record's password (fail-soft).
    pub fn reveal(&self, record: &VaultRecord) -> RevealedSecret {
        hooks::reveal(&self.codec, record)
    }

    /// A display projection of the record with its password revealed.
    pub fn view(&self, record: &VaultRecord) -> RecordView {
        RecordView::new(record, self.reveal(record))
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<VaultRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, record_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<VaultRecord> {
    Ok(VaultRecord {
        id: Some(row.get(0)?),
        owner: row.get(1)?,
        title: row.get(2)?,
        username: row.get(3)?,
        secret: SecretField::Stored(row.get(4)?),
        website: row.get(5)?,
        category: row.get(6)?,
        notes: row.get(7)?,
        last_updated: parse_timestamp(row, 8)?,
        created_at: parse_timestamp(row, 9)?,
        updated_at: parse_timestamp(row, 10)?,
    })
}
