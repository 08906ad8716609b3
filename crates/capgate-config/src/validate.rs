//! Configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges and that cross-field invariants hold.

use std::collections::HashSet;

use capgate_core::Policy;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Validate a deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_audit(config)?;
    validate_principals(config)?;
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let level = config.logging.level.trim();
    if level.is_empty() {
        return Err(ConfigError::validation(
            "logging.level",
            "log level must not be empty",
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&level.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::validation(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    let format = config.logging.format.trim().to_ascii_lowercase();
    if !valid_formats.contains(&format.as_str()) {
        return Err(ConfigError::validation(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    Ok(())
}

fn validate_audit(config: &Config) -> ConfigResult<()> {
    let audit = &config.audit;
    if audit.enabled && audit.sink.uses_memory() && audit.memory_capacity == 0 {
        return Err(ConfigError::validation(
            "audit.memory_capacity",
            format!(
                "memory sink selected (sink = \"{}\") but capacity is 0",
                audit.sink
            ),
        ));
    }
    Ok(())
}

fn validate_principals(config: &Config) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for (index, principal) in config.principals.iter().enumerate() {
        let field = format!("principals[{index}]");

        if principal.id.trim().is_empty() {
            return Err(ConfigError::validation(
                format!("{field}.id"),
                "principal id must not be empty",
            ));
        }
        if !seen.insert(principal.id.as_str()) {
            return Err(ConfigError::validation(
                format!("{field}.id"),
                format!("duplicate principal id '{}'", principal.id),
            ));
        }

        for (policy_index, policy) in principal.policies.iter().enumerate() {
            validate_policy(&format!("{field}.policies[{policy_index}]"), policy)?;
        }
    }

    Ok(())
}

fn validate_policy(field: &str, policy: &Policy) -> ConfigResult<()> {
    if policy.resource_pattern().is_empty() {
        return Err(ConfigError::validation(
            format!("{field}.resource"),
            "resource pattern must not be empty",
        ));
    }
    if policy.action_pattern().is_empty() {
        return Err(ConfigError::validation(
            format!("{field}.action"),
            "action pattern must not be empty",
        ));
    }
    if let Some((modifier, _)) = policy.modifier()
        && modifier.trim().is_empty()
    {
        return Err(ConfigError::validation(
            format!("{field}.modifier"),
            "modify policy must name a modifier",
        ));
    }
    Ok(())
}
