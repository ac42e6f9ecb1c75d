pub mod mock;
pub mod openai;

use async_trait::async_trait;

use crate::error::ProviderError;

/// An external text-classification capability. One prompt in, raw text out.
///
/// Implementations do not interpret the reply; prompt construction and
/// response validation belong to [`CapabilityTagger`](crate::tagger::capability::CapabilityTagger).
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    async fn classify(&self, prompt: &str) -> Result<String, ProviderError>;
}
