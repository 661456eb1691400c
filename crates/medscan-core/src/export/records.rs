//! Record export for spreadsheets and downstream systems.

use serde::{Deserialize, Serialize};

use crate::db::{actions, Database, DbResult};
use crate::models::{PatientRecord, Session};

/// Column order of the CSV export.
pub const CSV_HEADER: &str = "record_id,patient_id,patient_name,age,gender,date,diagnosis,prescription,image_url,doctor_id,created_at";

/// Records visible to one user at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordExport {
    /// Who requested the export
    pub exported_by: String,
    /// Export timestamp
    pub exported_at: String,
    pub records: Vec<PatientRecord>,
}

impl RecordExport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str(CSV_HEADER);
        csv.push('\n');

        for stored in &self.records {
            let record = &stored.record;
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&stored.record_id),
                escape_csv(&record.patient_id),
                escape_csv(&record.patient_name),
                record.age.map(|a| a.to_string()).unwrap_or_default(),
                record.gender.map(|g| g.as_str()).unwrap_or(""),
                record.date,
                escape_csv(record.diagnosis.as_deref().unwrap_or("")),
                escape_csv(record.prescription.as_deref().unwrap_or("")),
                escape_csv(record.image_url.as_deref().unwrap_or("")),
                escape_csv(&record.doctor_id),
                escape_csv(&stored.created_at),
            ));
        }

        csv
    }
}

/// Record exporter.
pub struct RecordExporter<'a> {
    db: &'a Database,
}

impl<'a> RecordExporter<'a> {
    /// Create a new record exporter.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Snapshot the records the session may see and audit the export.
    pub fn export(&self, session: &Session) -> DbResult<RecordExport> {
        let records = self.db.list_records(session)?;
        let scope = if session.is_admin() { "all" } else { "own" };

        self.db.append_audit(
            &session.doctor_id,
            actions::RECORDS_EXPORTED,
            scope,
            Some(&format!("{} records", records.len())),
        )?;

        tracing::info!(
            doctor_id = %session.doctor_id,
            scope,
            count = records.len(),
            "Records exported"
        );

        Ok(RecordExport {
            exported_by: session.doctor_id.clone(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            records,
        })
    }

    /// Export as CSV.
    pub fn export_csv(&self, session: &Session) -> DbResult<String> {
        Ok(self.export(session)?.to_csv())
    }

    /// Export as JSON.
    pub fn export_json(&self, session: &Session) -> DbResult<String> {
        Ok(self.export(session)?.to_json()?)
    }
}

/// Escape a string for CSV output.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
