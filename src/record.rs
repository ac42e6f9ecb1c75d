//! Shared record types and the tag token format.
//!
//! A tag is a lowercase, underscore-separated token: one or more runs of
//! `[a-z0-9]` joined by single underscores (`late_delivery`, `product_failure`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tagging strategy produced a record's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    Capability,
    Heuristic,
}

impl TagSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagSource::Capability => "capability",
            TagSource::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for TagSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TagSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capability" => Ok(TagSource::Capability),
            "heuristic" => Ok(TagSource::Heuristic),
            other => anyhow::bail!("unknown tag source: {other}"),
        }
    }
}

/// One processed review. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub text: String,
    pub tags: Vec<String>,
    /// Wall-clock seconds spent tagging, rounded to milliseconds.
    pub processing_time: f64,
    pub source: TagSource,
}

impl ReviewRecord {
    pub fn new(
        text: impl Into<String>,
        tags: Vec<String>,
        processing_time: f64,
        source: TagSource,
    ) -> Self {
        Self {
            text: text.into(),
            tags,
            processing_time,
            source,
        }
    }
}

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Whether `tag` is already in normalized token form.
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && !tag.starts_with('_')
        && !tag.ends_with('_')
        && !tag.contains("__")
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Normalize a raw label into the tag token format.
///
/// Surrounding whitespace and quotes are stripped, letters lowercased, and
/// every run of other characters collapses to a single underscore. Returns
/// `None` when nothing usable is left.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
    let mut tag = String::with_capacity(trimmed.len());
    let mut pending_separator = false;

    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !tag.is_empty() {
                tag.push('_');
            }
            pending_separator = false;
            tag.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if tag.is_empty() { None } else { Some(tag) }
}

/// Normalize a list of raw labels: invalid entries dropped, duplicates removed
/// keeping the first occurrence, result capped at `max`.
pub fn normalize_tags<I, S>(raw: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for label in raw {
        if tags.len() == max {
            break;
        }
        if let Some(tag) = normalize_tag(label.as_ref())
            && !tags.contains(&tag)
        {
            tags.push(tag);
        }
    }
    tags
}
