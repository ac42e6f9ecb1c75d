//! Project-wide constants.

use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of tags attached to a single review (K).
pub const DEFAULT_MAX_TAGS: usize = 3;

/// How many tags the summary endpoint reports.
pub const SUMMARY_TOP_K: usize = 3;

/// Default chat model for capability-backed tagging.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Sampling temperature sent with every classification request.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Upper bound on a single provider call, in milliseconds.
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5_000;

/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Tag used by the heuristic when no keyword rule matches.
pub const GENERAL_FEEDBACK_TAG: &str = "general_feedback";

/// Default database path: `~/.reviewtag/reviewtag.db`.
/// Single DB for stored reviews and (optionally) aggregate counters.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".reviewtag")
        .join("reviewtag.db")
}
