//! Patient record database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use strsim::jaro_winkler;

use super::audit::actions;
use super::{Database, DbError, DbResult};
use crate::models::{Gender, NewRecord, PatientRecord, Session};

/// Minimum name similarity for a search hit.
const MIN_SEARCH_SCORE: f64 = 0.80;

const RECORD_COLUMNS: &str = r#"
    record_id, patient_id, patient_name, age, gender, record_date,
    diagnosis, prescription, image_url, doctor_id, created_at
"#;

impl Database {
    /// Insert a reviewed record and audit it in one transaction.
    pub fn create_record(&self, record: &NewRecord) -> DbResult<PatientRecord> {
        if record.patient_name.trim().is_empty() {
            return Err(DbError::Constraint("patient name is empty".into()));
        }

        let stored = PatientRecord::new(record.clone());
        let tx = self.conn.unchecked_transaction()?;

        self.conn.execute(
            r#"
            INSERT INTO patient_records (
                record_id, patient_id, patient_name, age, gender, record_date,
                diagnosis, prescription, image_url, doctor_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                stored.record_id,
                record.patient_id,
                record.patient_name,
                record.age,
                record.gender.map(|g| g.as_str()),
                record.date.to_string(),
                record.diagnosis,
                record.prescription,
                record.image_url,
                record.doctor_id,
                stored.created_at,
            ],
        )?;

        self.append_audit(
            &record.doctor_id,
            actions::RECORD_CREATED,
            &stored.record_id,
            Some(&record.patient_id),
        )?;

        tx.commit()?;

        tracing::info!(
            record_id = %stored.record_id,
            patient_id = %record.patient_id,
            doctor_id = %record.doctor_id,
            "Record saved"
        );

        Ok(stored)
    }

    /// Get a record by ID.
    pub fn get_record(&self, record_id: &str) -> DbResult<Option<PatientRecord>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patient_records WHERE record_id = ?", RECORD_COLUMNS),
                [record_id],
                read_row,
            )
            .optional()?
            .map(PatientRecord::try_from)
            .transpose()
    }

    /// Records visible to the session, newest first.
    ///
    /// Doctors see their own records, admins see every record.
    pub fn list_records(&self, session: &Session) -> DbResult<Vec<PatientRecord>> {
        let rows = if session.is_admin() {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM patient_records ORDER BY created_at DESC, rowid DESC",
                RECORD_COLUMNS
            ))?;
            let rows = stmt.query_map([], read_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM patient_records WHERE doctor_id = ? ORDER BY created_at DESC, rowid DESC",
                RECORD_COLUMNS
            ))?;
            let rows = stmt.query_map([&session.doctor_id], read_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        rows.into_iter().map(PatientRecord::try_from).collect()
    }

    /// Count records visible to the session.
    pub fn count_records(&self, session: &Session) -> DbResult<usize> {
        let count: i64 = if session.is_admin() {
            self.conn
                .query_row("SELECT COUNT(*) FROM patient_records", [], |row| row.get(0))?
        } else {
            self.conn.query_row(
                "SELECT COUNT(*) FROM patient_records WHERE doctor_id = ?",
                [&session.doctor_id],
                |row| row.get(0),
            )?
        };
        Ok(count as usize)
    }

    /// Fuzzy search by patient name or ID, best match first.
    ///
    /// OCR'd names are often misspelled, so names are ranked by
    /// Jaro-Winkler similarity rather than matched exactly.
    pub fn search_records(
        &self,
        session: &Session,
        query: &str,
        limit: usize,
    ) -> DbResult<Vec<PatientRecord>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, PatientRecord)> = self
            .list_records(session)?
            .into_iter()
            .filter_map(|record| {
                let score = search_score(&query, &record);
                (score >= MIN_SEARCH_SCORE).then_some((score, record))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored.into_iter().take(limit).map(|(_, r)| r).collect())
    }

    /// Delete a record. Doctors may only delete their own.
    pub fn delete_record(&self, session: &Session, record_id: &str) -> DbResult<bool> {
        let Some(record) = self.get_record(record_id)? else {
            return Ok(false);
        };

        if !session.is_admin() && record.record.doctor_id != session.doctor_id {
            return Err(DbError::Forbidden(format!(
                "record {} belongs to another doctor",
                record_id
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        let rows_affected = self
            .conn
            .execute("DELETE FROM patient_records WHERE record_id = ?", [record_id])?;
        self.append_audit(
            &session.doctor_id,
            actions::RECORD_DELETED,
            record_id,
            Some(&record.record.patient_id),
        )?;
        tx.commit()?;

        Ok(rows_affected > 0)
    }
}

fn search_score(query: &str, record: &PatientRecord) -> f64 {
    let name = record.record.patient_name.to_lowercase();
    let patient_id = record.record.patient_id.to_lowercase();

    if patient_id == query || name == query {
        return 1.0;
    }
    if name.contains(query) || patient_id.starts_with(query) {
        return 0.95;
    }

    // Best of whole-name and per-word similarity
    name.split_whitespace()
        .map(|word| jaro_winkler(query, word))
        .fold(jaro_winkler(query, &name), f64::max)
}

/// Intermediate row struct for database mapping.
struct RecordRow {
    record_id: String,
    patient_id: String,
    patient_name: String,
    age: Option<i64>,
    gender: Option<String>,
    record_date: String,
    diagnosis: Option<String>,
    prescription: Option<String>,
    image_url: Option<String>,
    doctor_id: String,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        record_id: row.get(0)?,
        patient_id: row.get(1)?,
        patient_name: row.get(2)?,
        age: row.get(3)?,
        gender: row.get(4)?,
        record_date: row.get(5)?,
        diagnosis: row.get(6)?,
        prescription: row.get(7)?,
        image_url: row.get(8)?,
        doctor_id: row.get(9)?,
        created_at: row.get(10)?,
    })
}

impl TryFrom<RecordRow> for PatientRecord {
    type Error = DbError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&row.record_date, "%Y-%m-%d").map_err(|_| {
            DbError::Constraint(format!("Invalid record date: {}", row.record_date))
        })?;

        let gender = row
            .gender
            .map(|g| {
                Gender::from_canonical(&g)
                    .ok_or_else(|| DbError::Constraint(format!("Unknown gender: {}", g)))
            })
            .transpose()?;

        Ok(PatientRecord {
            record_id: row.record_id,
            record: NewRecord {
                patient_id: row.patient_id,
                patient_name: row.patient_name,
                age: row.age,
                gender,
                date,
                diagnosis: row.diagnosis,
                prescription: row.prescription,
                image_url: row.image_url,
                doctor_id: row.doctor_id,
            },
            created_at: row.created_at,
        })
    }
}
