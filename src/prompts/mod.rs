pub mod tagging;

pub use tagging::build_tagging_prompt;
