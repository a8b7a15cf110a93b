//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of discussion events
    pub conversation_log: Option<String>,
    /// Directory for `discussion_<timestamp>.log` diagnostic files
    pub log_dir: Option<String>,
}
