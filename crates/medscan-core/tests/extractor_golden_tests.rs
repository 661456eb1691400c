//! Golden tests for the pattern extractor.
//!
//! These tests pin extraction results for representative OCR transcripts.

use chrono::{Local, TimeZone};
use medscan_core::extractor::extract_fields;
use medscan_core::models::{ExtractedFields, Role, Session};
use medscan_core::review::reconcile;

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    text: &'static str,
    patient_name: &'static str,
    age: &'static str,
    gender: &'static str,
    date: &'static str,
    diagnosis: &'static str,
    prescription: &'static str,
}

impl GoldenCase {
    fn expected(&self) -> ExtractedFields {
        ExtractedFields {
            patient_name: self.patient_name.into(),
            age: self.age.into(),
            gender: self.gender.into(),
            date: self.date.into(),
            diagnosis: self.diagnosis.into(),
            prescription: self.prescription.into(),
        }
    }
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "canonical-record",
            text: "Patient Name: Alice Walker\nAge: 34\nGender: F\nDiagnosis: Seasonal allergies\nRx: Loratadine 10mg",
            patient_name: "Alice Walker",
            age: "34",
            gender: "Female",
            date: "",
            diagnosis: "Seasonal allergies",
            prescription: "Loratadine 10mg",
        },
        GoldenCase {
            id: "clinic-letterhead",
            text: "Date: 05/11/2023\nPt. Name: Ravi Kumar\nAge: 45 yrs   Sex: M\nDx: Type 2 diabetes\nRx: Metformin 500mg BD",
            patient_name: "Ravi Kumar",
            age: "45",
            gender: "Male",
            date: "05/11/2023",
            diagnosis: "Type 2 diabetes",
            prescription: "Metformin 500mg BD",
        },
        GoldenCase {
            id: "unlabeled-note",
            text: "Follow up visit for Carlos Mendes, 42, with cough",
            patient_name: "Carlos Mendes",
            age: "42",
            gender: "",
            date: "",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "two-patients-first-wins",
            text: "Name: Maria Lopez\nAge: 29\nName: John Carter\nAge: 71",
            patient_name: "Maria Lopez",
            age: "29",
            gender: "",
            date: "",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "uppercase-form",
            text: "PATIENT: SARAH CONNOR\nSEX: FEMALE\nDIAGNOSIS: MIGRAINE",
            patient_name: "SARAH CONNOR",
            age: "",
            gender: "Female",
            date: "",
            diagnosis: "MIGRAINE",
            prescription: "",
        },
        GoldenCase {
            id: "written-date",
            text: "Name: Li Wei\nDate: 3rd March 2024\nSex: F",
            patient_name: "Li Wei",
            age: "",
            gender: "Female",
            date: "3rd March 2024",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "noisy-separators",
            text: "Name - Priya Nair\nAge:  8\nGender = female",
            patient_name: "Priya Nair",
            age: "8",
            gender: "Female",
            date: "",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "two-digit-year",
            text: "Name: Jane Doe\nAge: 61\nDate: 5 Mar 24",
            patient_name: "Jane Doe",
            age: "61",
            gender: "",
            date: "5 Mar 24",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "abbreviated-month-with-period",
            text: "Name: Tom Baker\nAge: 50\nDate: Mar. 5, 2024",
            patient_name: "Tom Baker",
            age: "50",
            gender: "",
            date: "Mar. 5, 2024",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "dotted-iso-date",
            text: "Name: Ana Silva\nAge: 33\nDate: 2024.03.05",
            patient_name: "Ana Silva",
            age: "33",
            gender: "",
            date: "2024.03.05",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "impossible-date-skipped",
            text: "Name: Ana Silva\nAge: 33\nDate: 31/02/2024\nDate: 01/03/2024",
            patient_name: "Ana Silva",
            age: "33",
            gender: "",
            date: "01/03/2024",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "ocr-mangled-female",
            text: "Name: Grace Hopper\nAge: 85\nGender: Fernale",
            patient_name: "Grace Hopper",
            age: "85",
            gender: "Female",
            date: "",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "ocr-mangled-male",
            text: "Name: Alan Turing\nAge: 41\nSex: rnale",
            patient_name: "Alan Turing",
            age: "41",
            gender: "Male",
            date: "",
            diagnosis: "",
            prescription: "",
        },
        GoldenCase {
            id: "blank-page",
            text: "\n   \n",
            patient_name: "",
            age: "",
            gender: "",
            date: "",
            diagnosis: "",
            prescription: "",
        },
    ]
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let fields = extract_fields(case.text);
        assert_eq!(fields, case.expected(), "Case {}", case.id);
    }
}

#[test]
fn test_golden_cases_reconcile() {
    let session = Session::new("doc-1".into(), "Dr. Rao".into(), Role::Doctor);
    let now = Local.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();

    for case in get_golden_cases().iter().filter(|c| !c.patient_name.is_empty()) {
        let fields = extract_fields(case.text);
        let record = reconcile(&fields, &session, None, now);
        assert!(record.is_ok(), "Case {}: {:?}", case.id, record);
    }
}

#[test]
fn test_golden_ids_unique() {
    let cases = get_golden_cases();
    let mut ids: Vec<_> = cases.iter().map(|c| c.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), cases.len());
}
