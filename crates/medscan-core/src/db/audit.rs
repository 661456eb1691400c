//! Hash-chained audit log.
//!
//! Each entry commits to the previous entry's hash, so rewriting any row
//! breaks every hash after it.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Database, DbResult};

/// `prev_hash` of the first entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Audit action names.
pub mod actions {
    pub const RECORD_CREATED: &str = "record.created";
    pub const RECORD_DELETED: &str = "record.deleted";
    pub const RECORDS_EXPORTED: &str = "records.exported";
}

/// A single audit entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: i64,
    /// User who performed the action
    pub actor: String,
    pub action: String,
    /// What the action was applied to (record ID, export scope, ...)
    pub subject: String,
    pub detail: Option<String>,
    pub prev_hash: String,
    pub entry_hash: String,
    pub created_at: String,
}

impl Database {
    /// Append an entry to the audit log.
    pub fn append_audit(
        &self,
        actor: &str,
        action: &str,
        subject: &str,
        detail: Option<&str>,
    ) -> DbResult<AuditEntry> {
        let prev_hash = self
            .last_audit_hash()?
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let created_at = chrono::Utc::now().to_rfc3339();
        let entry_hash = entry_hash(&prev_hash, actor, action, subject, detail, &created_at)?;

        self.conn.execute(
            r#"
            INSERT INTO audit_log (actor, action, subject, detail, prev_hash, entry_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![actor, action, subject, detail, prev_hash, entry_hash, created_at],
        )?;

        Ok(AuditEntry {
            id: self.conn.last_insert_rowid(),
            actor: actor.to_string(),
            action: action.to_string(),
            subject: subject.to_string(),
            detail: detail.map(str::to_string),
            prev_hash,
            entry_hash,
            created_at,
        })
    }

    /// Most recent entries, newest first.
    pub fn list_audit(&self, limit: usize) -> DbResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, actor, action, subject, detail, prev_hash, entry_hash, created_at
            FROM audit_log
            ORDER BY id DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], row_to_entry)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Entries about one subject, oldest first.
    pub fn audit_for_subject(&self, subject: &str) -> DbResult<Vec<AuditEntry>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, actor, action, subject, detail, prev_hash, entry_hash, created_at
            FROM audit_log
            WHERE subject = ?
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([subject], row_to_entry)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Recompute every hash and check the links between entries.
    pub fn verify_audit_chain(&self) -> DbResult<bool> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, actor, action, subject, detail, prev_hash, entry_hash, created_at
            FROM audit_log
            ORDER BY id
            "#,
        )?;

        let mut expected_prev = GENESIS_HASH.to_string();
        let rows = stmt.query_map([], row_to_entry)?;

        for row in rows {
            let entry = row?;
            if entry.prev_hash != expected_prev {
                tracing::warn!(id = entry.id, "Audit chain link broken");
                return Ok(false);
            }

            let recomputed = entry_hash(
                &entry.prev_hash,
                &entry.actor,
                &entry.action,
                &entry.subject,
                entry.detail.as_deref(),
                &entry.created_at,
            )?;
            if recomputed != entry.entry_hash {
                tracing::warn!(id = entry.id, "Audit entry hash mismatch");
                return Ok(false);
            }

            expected_prev = entry.entry_hash;
        }

        Ok(true)
    }

    fn last_audit_hash(&self) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT entry_hash FROM audit_log ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditEntry> {
    Ok(AuditEntry {
        id: row.get(0)?,
        actor: row.get(1)?,
        action: row.get(2)?,
        subject: row.get(3)?,
        detail: row.get(4)?,
        prev_hash: row.get(5)?,
        entry_hash: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Hash an entry. Fields are encoded as a JSON array so no separator can be
/// forged from inside a value.
fn entry_hash(
    prev_hash: &str,
    actor: &str,
    action: &str,
    subject: &str,
    detail: Option<&str>,
    created_at: &str,
) -> DbResult<String> {
    let canonical = serde_json::to_string(&(prev_hash, actor, action, subject, detail, created_at))?;
    Ok(hash_data(canonical.as_bytes()))
}

/// Compute SHA-256 hash of data.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_first_entry_links_to_genesis() {
        let db = setup_db();
        let entry = db
            .append_audit("doc-1", actions::RECORD_CREATED, "rec-1", None)
            .unwrap();

        assert_eq!(entry.prev_hash, GENESIS_HASH);
        assert_eq!(entry.entry_hash.len(), 64);
    }

    #[test]
    fn test_entries_chain() {
        let db = setup_db();
        let first = db
            .append_audit("doc-1", actions::RECORD_CREATED, "rec-1", None)
            .unwrap();
        let second = db
            .append_audit("doc-1", actions::RECORDS_EXPORTED, "own", Some("1 rows"))
            .unwrap();

        assert_eq!(second.prev_hash, first.entry_hash);
        assert!(db.verify_audit_chain().unwrap());
    }

    #[test]
    fn test_list_newest_first() {
        let db = setup_db();
        for i in 0..3 {
            db.append_audit("doc-1", actions::RECORD_CREATED, &format!("rec-{}", i), None)
                .unwrap();
        }

        let entries = db.list_audit(2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].subject, "rec-2");
        assert_eq!(entries[1].subject, "rec-1");
    }

    #[test]
    fn test_tampering_detected() {
        let db = setup_db();
        db.append_audit("doc-1", actions::RECORD_CREATED, "rec-1", None)
            .unwrap();
        db.append_audit("doc-1", actions::RECORD_DELETED, "rec-1", None)
            .unwrap();

        // Bypass the append-only trigger to simulate an out-of-band edit
        db.conn()
            .execute_batch(
                "DROP TRIGGER audit_log_no_update;
                 UPDATE audit_log SET actor = 'mallory' WHERE id = 1;",
            )
            .unwrap();

        assert!(!db.verify_audit_chain().unwrap());
    }

    #[test]
    fn test_empty_chain_verifies() {
        let db = setup_db();
        assert!(db.verify_audit_chain().unwrap());
    }

    #[test]
    fn test_hash_data() {
        assert_eq!(
            hash_data(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
