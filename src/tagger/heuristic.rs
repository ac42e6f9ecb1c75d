use async_trait::async_trait;

use super::TagStrategy;
use crate::consts::GENERAL_FEEDBACK_TAG;
use crate::error::ProviderError;
use crate::record::TagSource;

/// One keyword rule: any keyword found in the lowercased text contributes
/// all of `tags`.
struct Rule {
    keywords: &'static [&'static str],
    tags: &'static [&'static str],
}

/// Evaluated top to bottom. Order is part of the output contract.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["late", "delay"],
        tags: &["late_delivery", "shipping_delay"],
    },
    Rule {
        keywords: &["broken", "not working", "defective"],
        tags: &["defective_item", "product_failure"],
    },
    Rule {
        keywords: &["refund", "return"],
        tags: &["refund_request", "customer_service"],
    },
    Rule {
        keywords: &["damaged", "packaging"],
        tags: &["damaged_packaging"],
    },
    Rule {
        keywords: &["expensive", "overpriced", "price"],
        tags: &["pricing"],
    },
    Rule {
        keywords: &["rude", "unhelpful", "support"],
        tags: &["customer_service"],
    },
    Rule {
        keywords: &["great", "love", "excellent", "perfect"],
        tags: &["positive_feedback"],
    },
];

/// Deterministic keyword-matching tagger. Pure computation, never fails.
#[derive(Debug, Clone)]
pub struct HeuristicTagger {
    max_tags: usize,
}

impl HeuristicTagger {
    pub fn new(max_tags: usize) -> Self {
        Self { max_tags }
    }

    /// Tags for `text`: matching rules contribute in table order until K
    /// tags are collected. Non-blank text with no match gets
    /// `general_feedback`; blank text gets nothing.
    ///
    /// Matching does not stop at the first rule, so "late and broken" yields
    /// `late_delivery, shipping_delay, defective_item` rather than two tags.
    pub fn tags_for(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        if lower.trim().is_empty() || self.max_tags == 0 {
            return Vec::new();
        }

        let mut tags: Vec<String> = Vec::new();
        'rules: for rule in RULES {
            if !rule.keywords.iter().any(|keyword| lower.contains(keyword)) {
                continue;
            }
            for tag in rule.tags {
                if tags.len() == self.max_tags {
                    break 'rules;
                }
                if !tags.iter().any(|t| t == tag) {
                    tags.push(tag.to_string());
                }
            }
        }

        if tags.is_empty() {
            tags.push(GENERAL_FEEDBACK_TAG.to_string());
        }
        tags
    }
}

/// The fixed tag vocabulary, in rule order, ending with the catch-all tag.
pub fn taxonomy() -> Vec<&'static str> {
    let mut vocabulary: Vec<&'static str> = Vec::new();
    for tag in RULES.iter().flat_map(|rule| rule.tags.iter().copied()) {
        if !vocabulary.contains(&tag) {
            vocabulary.push(tag);
        }
    }
    vocabulary.push(GENERAL_FEEDBACK_TAG);
    vocabulary
}

#[async_trait]
impl TagStrategy for HeuristicTagger {
    fn source(&self) -> TagSource {
        TagSource::Heuristic
    }

    async fn tag_text(&self, text: &str) -> Result<Vec<String>, ProviderError> {
        Ok(self.tags_for(text))
    }
}
