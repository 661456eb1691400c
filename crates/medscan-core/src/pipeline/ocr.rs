//! OCR collaborator port.

use async_trait::async_trait;
use thiserror::Error;

/// OCR failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OcrError {
    #[error("No text recognized")]
    NoText,

    #[error("OCR engine error: {0}")]
    Engine(String),

    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),
}

/// Turns an image into raw text. Implementations live outside this crate.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

#[async_trait]
impl<T: OcrEngine + ?Sized> OcrEngine for Box<T> {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image).await
    }
}

/// OCR engine returning canned text, for tests and offline demos.
#[derive(Debug, Clone)]
pub struct StaticOcr {
    result: Result<String, OcrError>,
}

impl StaticOcr {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
        }
    }

    pub fn failing(error: OcrError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl OcrEngine for StaticOcr {
    async fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        self.result.clone()
    }
}
