//! End-to-end tests: scan, review, save, search and export.

use medscan_core::db::{actions, Database};
use medscan_core::export::RecordExporter;
use medscan_core::models::{Field, Gender, Role, SessionContext};
use medscan_core::pipeline::{ScanPipeline, StaticOcr};
use medscan_core::review::SaveError;
use medscan_core::PatternExtractor;

const OCR_TEXT: &str = "Patient Name: Alice Walker\nAge: 34\nGender: F\nDate: 12/03/2024\nDiagnosis: Seasonal allergies\nRx: Loratadine 10mg";

#[tokio::test]
async fn test_scan_review_save_flow() {
    let db = Database::open_in_memory().unwrap();
    let mut ctx = SessionContext::new();
    ctx.sign_in("doc-1", "Dr. Rao", Role::Doctor).unwrap();
    let session = ctx.current_user().unwrap().clone();

    let pipeline = ScanPipeline::new(StaticOcr::text(OCR_TEXT), PatternExtractor::new());
    let mut form = pipeline
        .scan_into_form(b"jpeg bytes", Some("https://files.example/scan-1.jpg".into()))
        .await
        .unwrap();

    // Doctor corrects the prescription before saving
    form.set(Field::Prescription, "Loratadine 10mg once daily");
    let record_id = form.save(&db, &session).unwrap().record_id.clone();

    let stored = db.get_record(&record_id).unwrap().unwrap();
    assert_eq!(stored.record.patient_name, "Alice Walker");
    assert_eq!(stored.record.age, Some(34));
    assert_eq!(stored.record.gender, Some(Gender::Female));
    assert_eq!(stored.record.date.to_string(), "2024-03-12");
    assert_eq!(
        stored.record.prescription.as_deref(),
        Some("Loratadine 10mg once daily")
    );
    assert_eq!(
        stored.record.image_url.as_deref(),
        Some("https://files.example/scan-1.jpg")
    );
    assert_eq!(stored.record.doctor_id, "doc-1");

    assert!(matches!(
        form.save(&db, &session),
        Err(SaveError::AlreadySaved(_))
    ));
    assert_eq!(db.count_records(&session).unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_date_blocks_save() {
    let db = Database::open_in_memory().unwrap();
    let mut ctx = SessionContext::new();
    let session = ctx.sign_in("doc-1", "Dr. Rao", Role::Doctor).unwrap().clone();

    let pipeline = ScanPipeline::new(StaticOcr::text(OCR_TEXT), PatternExtractor::new());
    let mut form = pipeline.scan_into_form(b"jpeg", None).await.unwrap();
    form.set(Field::Date, "the other day");

    assert!(matches!(
        form.save(&db, &session),
        Err(SaveError::Validation(_))
    ));
    assert_eq!(db.count_records(&session).unwrap(), 0);
    assert!(db.list_audit(10).unwrap().is_empty());

    form.set(Field::Date, "");
    assert!(form.save(&db, &session).is_ok());
}

#[test]
fn test_persisted_records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db");

    let mut ctx = SessionContext::new();
    let session = ctx.sign_in("doc-1", "Dr. Rao", Role::Doctor).unwrap().clone();

    {
        let db = Database::open(&path).unwrap();
        let fields = medscan_core::extract_fields(OCR_TEXT);
        let mut form = medscan_core::ReviewForm::new(fields);
        form.save(&db, &session).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let results = db.search_records(&session, "alice", 10).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].record.patient_id.starts_with("ALI"));
    assert!(db.verify_audit_chain().unwrap());
}

#[test]
fn test_export_after_saves() {
    let db = Database::open_in_memory().unwrap();
    let mut ctx = SessionContext::new();
    let session = ctx.sign_in("admin", "Clinic Admin", Role::Admin).unwrap().clone();

    for text in [OCR_TEXT, "Name: Omar Haddad\nAge: 52\nSex: M"] {
        let mut form = medscan_core::ReviewForm::new(medscan_core::extract_fields(text));
        form.save(&db, &session).unwrap();
    }

    let csv = RecordExporter::new(&db).export_csv(&session).unwrap();
    assert_eq!(csv.lines().count(), 3);

    let audit = db.list_audit(1).unwrap();
    assert_eq!(audit[0].action, actions::RECORDS_EXPORTED);
    assert_eq!(audit[0].subject, "all");
    assert!(db.verify_audit_chain().unwrap());
}
