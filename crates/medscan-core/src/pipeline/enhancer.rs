//! Field enhancer port.

use async_trait::async_trait;

use crate::extractor::PatternExtractor;
use crate::models::ExtractedFields;

/// Maps raw OCR text onto the canonical field set.
///
/// Infallible by contract: implementations recover from their own failures
/// and always return a complete field set.
#[async_trait]
pub trait FieldEnhancer: Send + Sync {
    async fn enhance(&self, text: &str) -> ExtractedFields;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl FieldEnhancer for PatternExtractor {
    async fn enhance(&self, text: &str) -> ExtractedFields {
        self.extract(text)
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}

#[async_trait]
impl<T: FieldEnhancer + ?Sized> FieldEnhancer for Box<T> {
    async fn enhance(&self, text: &str) -> ExtractedFields {
        (**self).enhance(text).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
