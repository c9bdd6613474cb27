use crate::config::types::{Config, PolicyConfig, SpiderConfig, UserAgentConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Longest watchdog accepted, in seconds
const MAX_TIMEOUT_SECS: u64 = 600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_spider_config(&config.spider)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_policy_config(&config.policy)?;
    Ok(())
}

/// Validates watchdog configuration
fn validate_spider_config(config: &SpiderConfig) -> Result<(), ConfigError> {
    validate_timeout("probe_timeout_secs", config.probe_timeout_secs)?;
    validate_timeout("load_timeout_secs", config.load_timeout_secs)?;
    Ok(())
}

/// Validates a watchdog duration in seconds
pub fn validate_timeout(name: &str, secs: u64) -> Result<(), ConfigError> {
    if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_TIMEOUT_SECS, secs
        )));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates crawl policy configuration
fn validate_policy_config(config: &PolicyConfig) -> Result<(), ConfigError> {
    if let Some(pattern) = &config.restriction {
        Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid restriction '{}': {}", pattern, e))
        })?;
    }
    Ok(())
}
