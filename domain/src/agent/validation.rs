//! Configuration issues
//!
//! Configuration loaders report every problem they find as a [`ConfigIssue`]
//! instead of stopping at the first one. Any issue with [`Severity::Error`]
//! means the session must not start.
//!
//! # Examples
//!
//! ```
//! use agora_domain::agent::validation::{ConfigIssue, ConfigIssueCode, Severity};
//!
//! let issues = vec![ConfigIssue::error(ConfigIssueCode::EmptyRoster, "no agents configured")];
//! assert!(ConfigIssue::has_errors(&issues));
//! assert_eq!(issues[0].severity, Severity::Error);
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the session cannot start.
    Error,
    /// Non-fatal: the session runs but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// An agent entry has a blank name.
    EmptyAgentName { index: usize },
    /// An agent or the summarizer has a blank model identifier.
    EmptyModelName { agent: String },
    /// Two agents share a name.
    DuplicateAgent { name: String },
    /// No agents are configured.
    EmptyRoster,
    /// `max_rounds` is zero.
    ZeroRounds,
    /// A retry or persistence attempt count is zero.
    ZeroAttempts { field: String },
    /// The per-call timeout is zero.
    ZeroTimeout,
    /// `next_points_limit` is outside `1..=5`.
    NextPointsLimitOutOfRange { value: usize },
    /// The round duration is zero, so remaining time is always zero.
    ZeroRoundDuration,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Whether any issue is fatal
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}
