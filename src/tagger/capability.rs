use async_trait::async_trait;
use std::sync::Arc;

use super::TagStrategy;
use crate::classifier::Classifier;
use crate::error::ProviderError;
use crate::prompts::build_tagging_prompt;
use crate::record::{TagSource, normalize_tags};

/// Tagging delegated to an external [`Classifier`].
pub struct CapabilityTagger {
    classifier: Arc<dyn Classifier>,
    taxonomy: Vec<&'static str>,
    max_tags: usize,
}

impl CapabilityTagger {
    pub fn new(classifier: Arc<dyn Classifier>, taxonomy: Vec<&'static str>, max_tags: usize) -> Self {
        Self {
            classifier,
            taxonomy,
            max_tags,
        }
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Validate and normalize a raw provider reply.
    ///
    /// The reply must be a JSON array of strings (markdown fences tolerated)
    /// with at most `max_tags` entries and at least one usable tag.
    pub fn parse_response(raw: &str, max_tags: usize) -> Result<Vec<String>, ProviderError> {
        let json_str = extract_json(raw);
        let labels: Vec<String> = serde_json::from_str(json_str).map_err(|e| {
            ProviderError::Malformed(format!("expected a JSON array of strings: {e}; raw: {raw}"))
        })?;

        if labels.len() > max_tags {
            return Err(ProviderError::TooManyTags {
                got: labels.len(),
                max: max_tags,
            });
        }

        let tags = normalize_tags(&labels, max_tags);
        if tags.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(tags)
    }
}

#[async_trait]
impl TagStrategy for CapabilityTagger {
    fn source(&self) -> TagSource {
        TagSource::Capability
    }

    async fn tag_text(&self, text: &str) -> Result<Vec<String>, ProviderError> {
        let prompt = build_tagging_prompt(text, &self.taxonomy, self.max_tags);
        let raw = self.classifier.classify(&prompt).await?;
        Self::parse_response(&raw, self.max_tags)
    }
}

/// Extract JSON from text that may be wrapped in markdown code fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(after) = trimmed.strip_prefix("```json")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }
    if let Some(after) = trimmed.strip_prefix("```")
        && let Some(json) = after.strip_suffix("```")
    {
        return json.trim();
    }

    trimmed
}
