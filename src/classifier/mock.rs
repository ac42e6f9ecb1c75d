use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::Classifier;
use crate::error::ProviderError;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this raw text.
    Text(String),
    /// Fail with a transport error carrying this message.
    Fail(String),
    /// Sleep, then return the text. Used to exercise timeouts.
    Slow(Duration, String),
}

/// A scripted classifier for tests. Returns pre-defined replies in order.
pub struct MockClassifier {
    replies: Vec<MockReply>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockClassifier {
    pub fn new(replies: Vec<MockReply>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: a classifier that answers every call with `text`.
    pub fn always(text: &str) -> Self {
        Self::new(vec![MockReply::Text(text.to_string()); 64])
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, prompt: &str) -> Result<String, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.get(i).cloned().ok_or_else(|| {
            ProviderError::Transport(format!(
                "MockClassifier: no more replies (called {} times)",
                i + 1
            ))
        })?;
        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(message) => Err(ProviderError::Transport(message)),
            MockReply::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }
}
