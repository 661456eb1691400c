//! Remote enhancement with pattern-extractor fallback.

use async_trait::async_trait;

use medscan_core::config::EnhancementConfig;
use medscan_core::extractor::extract_fields;
use medscan_core::models::ExtractedFields;
use medscan_core::pipeline::FieldEnhancer;
use medscan_core::PatternExtractor;

use crate::client::{EnhancementClient, HttpEnhancementClient};
use crate::extraction::{parse_enhanced_fields, unwrap_envelope, ExtractionResult};
use crate::prompts::build_full_prompt;

/// Asks a remote model for the fields, falling back to the pattern extractor.
///
/// One request per document, no retry. Whatever the model leaves empty is
/// filled from the pattern extractor, so the result is never worse than
/// extraction alone.
pub struct RemoteEnhancer<C> {
    client: C,
    include_examples: bool,
}

impl<C: EnhancementClient> RemoteEnhancer<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            include_examples: true,
        }
    }

    /// Toggle few-shot examples in the prompt.
    pub fn with_examples(mut self, include_examples: bool) -> Self {
        self.include_examples = include_examples;
        self
    }

    async fn request_fields(&self, text: &str) -> ExtractionResult<ExtractedFields> {
        let prompt = build_full_prompt(text, self.include_examples);
        let body = self.client.generate(&prompt).await?;
        parse_enhanced_fields(&unwrap_envelope(&body))
    }
}

#[async_trait]
impl<C: EnhancementClient> FieldEnhancer for RemoteEnhancer<C> {
    async fn enhance(&self, text: &str) -> ExtractedFields {
        let fallback = extract_fields(text);

        match self.request_fields(text).await {
            Ok(mut fields) => {
                let answered = fields.filled_count();
                fields.fill_missing_from(&fallback);
                tracing::debug!(answered, filled = fields.filled_count(), "Remote enhancement applied");
                fields
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote enhancement failed, using pattern extraction");
                fallback
            }
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Pick the enhancer the configuration asks for.
pub fn enhancer_from_config(config: &EnhancementConfig) -> Box<dyn FieldEnhancer> {
    match HttpEnhancementClient::from_config(config) {
        Ok(Some(client)) => {
            tracing::info!(endpoint = %client.endpoint(), "Remote enhancement enabled");
            Box::new(RemoteEnhancer::new(client))
        }
        Ok(None) => Box::new(PatternExtractor::new()),
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build enhancement client, using pattern extraction");
            Box::new(PatternExtractor::new())
        }
    }
}
