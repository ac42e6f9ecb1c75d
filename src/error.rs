//! Failure modes of capability-backed tagging.
//!
//! None of these reach an HTTP caller: the dispatcher logs the reason and
//! falls back to the local heuristic.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credential configured, so the capability is never attempted.
    #[error("provider disabled: no credential configured")]
    Disabled,

    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider suggested {got} tags, at most {max} allowed")]
    TooManyTags { got: usize, max: usize },

    #[error("provider returned no usable tags")]
    Empty,
}

impl ProviderError {
    /// Short machine-friendly label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Disabled => "disabled",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Transport(_) => "transport",
            ProviderError::Status { .. } => "status",
            ProviderError::Malformed(_) => "malformed",
            ProviderError::TooManyTags { .. } => "too_many_tags",
            ProviderError::Empty => "empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_details() {
        let err = ProviderError::TooManyTags { got: 5, max: 3 };
        assert_eq!(err.to_string(), "provider suggested 5 tags, at most 3 allowed");

        let err = ProviderError::Status {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            ProviderError::Disabled.kind(),
            ProviderError::Timeout(Duration::from_millis(1)).kind(),
            ProviderError::Transport(String::new()).kind(),
            ProviderError::Status {
                status: 500,
                body: String::new(),
            }
            .kind(),
            ProviderError::Malformed(String::new()).kind(),
            ProviderError::TooManyTags { got: 4, max: 3 }.kind(),
            ProviderError::Empty.kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }
}
