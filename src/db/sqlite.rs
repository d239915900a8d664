// src/db/sqlite.rs
//! SQLite-backed [`VaultStore`]
//!
//! One `entries` table. The record body is stored as JSON; its sealed fields
//! are already tokens, so the database file never holds a plaintext secret.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::db::store::VaultStore;
use crate::enums::EntryKind;
use crate::error::{CoreError, Result};
use crate::model::{EntryId, OwnerId, Record, VaultEntry};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY,
        owner TEXT NOT NULL,
        kind TEXT NOT NULL,
        body TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_entries_owner ON entries(owner);
"#;

const SELECT_COLUMNS: &str = "SELECT id, owner, body, created_at, updated_at FROM entries";

pub struct SqliteStore {
    conn: Connection,
}

/// A row before its JSON body and timestamps are parsed.
struct RawRow {
    id: String,
    owner: String,
    body: String,
    created_at: String,
    updated_at: String,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            body: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn into_entry(self) -> Result<VaultEntry> {
        let record: Record = serde_json::from_str(&self.body)?;
        Ok(VaultEntry {
            id: EntryId::from(self.id),
            owner: OwnerId::new(self.owner),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
            record,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoreError::Validation(format!("bad timestamp '{raw}': {e}")))
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "vault database opened");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn query_entries(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<VaultEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, RawRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(RawRow::into_entry).collect()
    }
}

impl VaultStore for SqliteStore {
    fn insert(&mut self, entry: &VaultEntry) -> Result<()> {
        let body = serde_json::to_string(&entry.record)?;
        self.conn.execute(
            "INSERT INTO entries (id, owner, kind, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id.as_str(),
                entry.owner.as_str(),
                entry.kind().as_str(),
                body,
                entry.created_at.to_rfc3339(),
                entry.updated_at.to_rfc3339(),
            ],
        )?;
        debug!(entry_id = %entry.id, kind = entry.kind().as_str(), "entry inserted");
        Ok(())
    }

    fn get(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<VaultEntry>> {
        let raw = self
            .conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1 AND owner = ?2"),
                params![id.as_str(), owner.as_str()],
                RawRow::read,
            )
            .optional()?;
        raw.map(RawRow::into_entry).transpose()
    }

    fn list(&self, owner: &OwnerId, kind: Option<EntryKind>) -> Result<Vec<VaultEntry>> {
        match kind {
            Some(kind) => self.query_entries(
                &format!("{SELECT_COLUMNS} WHERE owner = ?1 AND kind = ?2"),
                params![owner.as_str(), kind.as_str()],
            ),
            None => self.query_entries(
                &format!("{SELECT_COLUMNS} WHERE owner = ?1"),
                params![owner.as_str()],
            ),
        }
    }

    fn replace(&mut self, entry: &VaultEntry) -> Result<()> {
        let body = serde_json::to_string(&entry.record)?;
        let changed = self.conn.execute(
            "UPDATE entries SET kind = ?3, body = ?4, updated_at = ?5
             WHERE id = ?1 AND owner = ?2",
            params![
                entry.id.as_str(),
                entry.owner.as_str(),
                entry.kind().as_str(),
                body,
                entry.updated_at.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound(entry.id.to_string()));
        }
        debug!(entry_id = %entry.id, "entry replaced");
        Ok(())
    }

    fn delete(&mut self, owner: &OwnerId, id: &EntryId) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM entries WHERE id = ?1 AND owner = ?2",
            params![id.as_str(), owner.as_str()],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }
        debug!(entry_id = %id, "entry deleted");
        Ok(())
    }
}
