//! Prompts for remote field enhancement.
//!
//! The model sees noisy OCR text and must answer with one JSON object holding
//! exactly the six canonical field names.

use medscan_core::models::Field;

/// System prompt for field enhancement.
pub const SYSTEM_PROMPT: &str = r#"You are a medical records assistant that reads OCR text from scanned or handwritten clinic records.

Extract the following fields:
- patientName: Full name of the patient
- age: Age in years (digits only)
- gender: One of "Male", "Female" or "Other"
- date: Date of the visit as written in the document
- diagnosis: Diagnosis, impression or chief complaint
- prescription: Medicines, doses and advice

Correct common OCR and handwriting errors (0/O, 1/l, 5/S, rn/m) in names and drug names.
Leave a field as an empty string when the document does not contain it. Never invent values.

Output a single JSON object with exactly these keys and nothing else."#;

/// User prompt for one document.
pub fn make_enhancement_prompt(ocr_text: &str) -> String {
    let keys = Field::ALL
        .iter()
        .map(|f| format!("\"{}\"", f.json_key()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Extract the patient record fields from this OCR text:

"{}"

Return a JSON object with the keys {}. Use "" for anything not present."#,
        ocr_text, keys
    )
}

/// Example few-shot prompts for better extraction accuracy.
pub const FEW_SHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "Pt Narne: Jarnes 0liver\nAge 5O\nSex M\nDx: Hypertension\nRx: Amlodipine 5mg OD",
        r#"{"patientName":"James Oliver","age":"50","gender":"Male","date":"","diagnosis":"Hypertension","prescription":"Amlodipine 5mg OD"}"#,
    ),
    (
        "12/01/2024  Mrs Fatima Begum 38F c/o fever x3 days\nadv: Paracetamol 500mg TDS",
        r#"{"patientName":"Fatima Begum","age":"38","gender":"Female","date":"12/01/2024","diagnosis":"Fever for 3 days","prescription":"Paracetamol 500mg TDS"}"#,
    ),
];

/// Build a complete prompt with system context and few-shot examples.
///
/// Plain text sections only; the endpoint applies its own chat template.
pub fn build_full_prompt(ocr_text: &str, include_examples: bool) -> String {
    let mut prompt = String::new();

    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n\n");

    if include_examples {
        for (i, (input, output)) in FEW_SHOT_EXAMPLES.iter().enumerate() {
            prompt.push_str(&format!("### Example {}\n", i + 1));
            prompt.push_str(&make_enhancement_prompt(input));
            prompt.push_str("\nAnswer: ");
            prompt.push_str(output);
            prompt.push_str("\n\n");
        }
    }

    prompt.push_str("### Record\n");
    prompt.push_str(&make_enhancement_prompt(ocr_text));
    prompt.push_str("\nAnswer: ");

    prompt
}
