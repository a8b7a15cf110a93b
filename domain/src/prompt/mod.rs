//! Prompt domain
//!
//! Templates for the prompts sent to debaters and to the summarizing moderator.

mod template;

pub use template::PromptTemplate;
