//! Completion endpoint configuration from TOML (`[api]` section)

use crate::openrouter::OpenRouterConfig;
use crate::openrouter::config::DEFAULT_BASE_URL;
use agora_domain::RetryPolicy;
use agora_domain::agent::validation::{ConfigIssue, ConfigIssueCode};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw endpoint and retry configuration from TOML
///
/// The API key is never read from the file; it comes from
/// `OPENROUTER_API_KEY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    pub base_url: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per agent call
    pub max_attempts: u32,
    /// Backoff base in milliseconds; doubles after each failed attempt
    pub base_delay_ms: u64,
    /// Shortest accepted reply, in characters
    pub min_response_chars: usize,
    pub temperature: f32,
    /// Completion bound for models that expect one
    pub max_tokens: u32,
    /// `HTTP-Referer` header override
    pub referer: Option<String>,
    /// `X-Title` header override
    pub title: Option<String>,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: policy.timeout.as_secs(),
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            min_response_chars: policy.min_response_chars,
            temperature: 0.7,
            max_tokens: 2048,
            referer: None,
            title: None,
        }
    }
}

impl FileApiConfig {
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_secs(self.timeout_secs),
        )
        .with_min_response_chars(self.min_response_chars)
    }

    /// Connection settings for the gateway, carrying `api_key`
    pub fn to_openrouter_config(&self, api_key: Secret<String>) -> OpenRouterConfig {
        let mut config = OpenRouterConfig::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);
        if let Some(referer) = &self.referer {
            config = config.with_referer(referer.clone());
        }
        if let Some(title) = &self.title {
            config = config.with_title(title.clone());
        }
        config
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.max_attempts == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroAttempts {
                    field: "api.max_attempts".to_string(),
                },
                "api.max_attempts must be at least 1",
            ));
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "api.timeout_secs must be at least 1",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_retry_policy() {
        let config = FileApiConfig::default();
        assert_eq!(config.to_retry_policy(), RetryPolicy::default());
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_to_openrouter_config_applies_overrides() {
        let config: FileApiConfig = toml::from_str(
            r#"
base_url = "http://localhost:4000/v1"
timeout_secs = 12
temperature = 0.2
max_tokens = 512
title = "ethics-debate"
"#,
        )
        .unwrap();

        let endpoint = config.to_openrouter_config(Secret::new("key".to_string()));
        assert_eq!(endpoint.base_url, "http://localhost:4000/v1");
        assert_eq!(endpoint.timeout, Duration::from_secs(12));
        assert_eq!(endpoint.temperature, 0.2);
        assert_eq!(endpoint.max_tokens, 512);
        assert_eq!(endpoint.title, "ethics-debate");
        assert_eq!(endpoint.referer, "https://github.com/agora-debate/agora");
    }

    #[test]
    fn test_retry_policy_from_file() {
        let config: FileApiConfig =
            toml::from_str("max_attempts = 5\nbase_delay_ms = 250\nmin_response_chars = 20").unwrap();
        let policy = config.to_retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.min_response_chars, 20);
    }

    #[test]
    fn test_validate_zero_attempts_and_timeout() {
        let config = FileApiConfig {
            max_attempts: 0,
            timeout_secs: 0,
            ..Default::default()
        };
        let codes: Vec<_> = config.validate().into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::ZeroAttempts {
                    field: "api.max_attempts".to_string()
                },
                ConfigIssueCode::ZeroTimeout,
            ]
        );
    }
}
