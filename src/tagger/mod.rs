//! Review tagging: two strategies behind one contract, composed by the
//! [`Dispatcher`] with a timeout and a silent fallback.

pub mod capability;
pub mod heuristic;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::classifier::openai::OpenAiClassifier;
use crate::config::{ProviderConfig, TaggerConfig};
use crate::error::ProviderError;
use crate::record::{TagSource, normalize_tags, round_to};
pub use capability::CapabilityTagger;
pub use heuristic::HeuristicTagger;

/// Something that turns review text into tags.
#[async_trait]
pub trait TagStrategy: Send + Sync {
    fn source(&self) -> TagSource;
    async fn tag_text(&self, text: &str) -> Result<Vec<String>, ProviderError>;
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tagging {
    pub tags: Vec<String>,
    /// End-to-end seconds including any fallback, rounded to milliseconds.
    pub processing_time: f64,
    pub source: TagSource,
}

/// Runs the capability strategy (when configured) under a timeout and falls
/// back to the local heuristic on any failure. Always returns a result.
pub struct Dispatcher {
    primary: Option<Arc<dyn TagStrategy>>,
    fallback: HeuristicTagger,
    timeout: Duration,
    max_tags: usize,
}

impl Dispatcher {
    pub fn new(primary: Option<Arc<dyn TagStrategy>>, config: &TaggerConfig) -> Self {
        Self {
            primary,
            fallback: HeuristicTagger::new(config.max_tags),
            timeout: config.provider_timeout,
            max_tags: config.max_tags,
        }
    }

    /// A dispatcher with no capability: every call uses the heuristic.
    pub fn heuristic_only(config: &TaggerConfig) -> Self {
        Self::new(None, config)
    }

    /// Wire up the capability from provider settings. A missing credential
    /// or a client that fails to build leaves the heuristic as the only
    /// strategy.
    pub fn from_config(tagger: &TaggerConfig, provider: &ProviderConfig) -> Self {
        if provider.credential().is_none() {
            info!("no provider credential configured, using heuristic tagging only");
            return Self::heuristic_only(tagger);
        }

        match OpenAiClassifier::new(provider, tagger.provider_timeout) {
            Ok(classifier) => {
                let primary = CapabilityTagger::new(
                    Arc::new(classifier),
                    heuristic::taxonomy(),
                    tagger.max_tags,
                );
                info!(
                    classifier = primary.classifier_name(),
                    api_base = %provider.api_base,
                    "capability tagging enabled"
                );
                Self::new(Some(Arc::new(primary)), tagger)
            }
            Err(error) => {
                warn!("failed to init provider client, using heuristic tagging only: {error:#}");
                Self::heuristic_only(tagger)
            }
        }
    }

    pub fn capability_enabled(&self) -> bool {
        self.primary.is_some()
    }

    pub fn max_tags(&self) -> usize {
        self.max_tags
    }

    pub async fn tag(&self, text: &str) -> Tagging {
        let started = Instant::now();

        let (tags, source) = match self.try_primary(text).await {
            Ok(tagged) => tagged,
            Err(ProviderError::Disabled) => (self.fallback.tags_for(text), TagSource::Heuristic),
            Err(error) => {
                warn!(
                    reason = error.kind(),
                    "capability tagging failed, falling back to heuristic: {error}"
                );
                (self.fallback.tags_for(text), TagSource::Heuristic)
            }
        };

        let processing_time = round_to(started.elapsed().as_secs_f64(), 3);
        debug!(%source, ?tags, processing_time, "tagged review");

        Tagging {
            tags,
            processing_time,
            source,
        }
    }

    async fn try_primary(&self, text: &str) -> Result<(Vec<String>, TagSource), ProviderError> {
        let primary = self.primary.as_ref().ok_or(ProviderError::Disabled)?;

        let raw = tokio::time::timeout(self.timeout, primary.tag_text(text))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        // Enforce the token format and bound whatever the strategy returned.
        if raw.len() > self.max_tags {
            return Err(ProviderError::TooManyTags {
                got: raw.len(),
                max: self.max_tags,
            });
        }
        let tags = normalize_tags(&raw, self.max_tags);
        if tags.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok((tags, primary.source()))
    }
}
