//! Scan pipeline: image → OCR text → enhanced fields → review form.

mod enhancer;
mod ocr;

pub use enhancer::*;
pub use ocr::*;

use thiserror::Error;

use crate::models::ExtractedFields;
use crate::review::ReviewForm;

/// Scan failures. All are worth retrying with a better image.
#[derive(Error, Debug, PartialEq)]
pub enum ScanError {
    #[error("Image is empty")]
    EmptyImage,

    #[error("No text found in image")]
    NoText,

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub raw_text: String,
    pub fields: ExtractedFields,
}

impl ScanOutcome {
    /// Hand the outcome to a review form.
    pub fn into_form(self, image_url: Option<String>) -> ReviewForm {
        ReviewForm::from_scan(self.fields, self.raw_text, image_url)
    }
}

/// OCR engine plus field enhancer.
pub struct ScanPipeline<O, E> {
    ocr: O,
    enhancer: E,
}

impl<O: OcrEngine, E: FieldEnhancer> ScanPipeline<O, E> {
    pub fn new(ocr: O, enhancer: E) -> Self {
        Self { ocr, enhancer }
    }

    /// OCR only.
    pub async fn extract_text(&self, image: &[u8]) -> Result<String, ScanError> {
        if image.is_empty() {
            return Err(ScanError::EmptyImage);
        }

        let text = match self.ocr.recognize(image).await {
            Err(OcrError::NoText) => return Err(ScanError::NoText),
            other => other?,
        };

        if text.trim().is_empty() {
            return Err(ScanError::NoText);
        }
        Ok(text)
    }

    /// OCR then enhance.
    pub async fn scan(&self, image: &[u8]) -> Result<ScanOutcome, ScanError> {
        let raw_text = self.extract_text(image).await?;
        let fields = self.enhancer.enhance(&raw_text).await;

        tracing::info!(
            enhancer = self.enhancer.name(),
            chars = raw_text.len(),
            filled = fields.filled_count(),
            "Scan complete"
        );

        Ok(ScanOutcome { raw_text, fields })
    }

    /// Scan straight into a review form.
    pub async fn scan_into_form(
        &self,
        image: &[u8],
        image_url: Option<String>,
    ) -> Result<ReviewForm, ScanError> {
        Ok(self.scan(image).await?.into_form(image_url))
    }
}
