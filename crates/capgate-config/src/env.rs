//! Environment variable overrides.
//!
//! Applied after the file layer, so a set variable always wins over the file.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{AuditSink, Config};

/// Overrides `logging.level`.
pub const LOG_LEVEL_VAR: &str = "CAPGATE_LOG_LEVEL";
/// Overrides `logging.format`.
pub const LOG_FORMAT_VAR: &str = "CAPGATE_LOG_FORMAT";
/// Overrides `audit.enabled`.
pub const AUDIT_ENABLED_VAR: &str = "CAPGATE_AUDIT_ENABLED";
/// Overrides `audit.sink`.
pub const AUDIT_SINK_VAR: &str = "CAPGATE_AUDIT_SINK";

/// Apply `CAPGATE_*` overrides from `env_vars` to `config`.
///
/// Returns the number of overrides applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] when a variable holds a value that
/// cannot be parsed for its field.
pub fn apply_env_overrides<S: BuildHasher>(
    config: &mut Config,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    if let Some(level) = env_vars.get(LOG_LEVEL_VAR) {
        config.logging.level.clone_from(level);
        count = count.saturating_add(1);
        debug!(var = LOG_LEVEL_VAR, "applying env override");
    }

    if let Some(format) = env_vars.get(LOG_FORMAT_VAR) {
        config.logging.format.clone_from(format);
        count = count.saturating_add(1);
        debug!(var = LOG_FORMAT_VAR, "applying env override");
    }

    if let Some(raw) = env_vars.get(AUDIT_ENABLED_VAR) {
        config.audit.enabled = parse_bool(raw).ok_or_else(|| ConfigError::EnvError {
            var_name: AUDIT_ENABLED_VAR.to_owned(),
            message: format!("expected a boolean, got '{raw}'"),
        })?;
        count = count.saturating_add(1);
        debug!(var = AUDIT_ENABLED_VAR, "applying env override");
    }

    if let Some(raw) = env_vars.get(AUDIT_SINK_VAR) {
        config.audit.sink = AuditSink::parse(raw).ok_or_else(|| ConfigError::EnvError {
            var_name: AUDIT_SINK_VAR.to_owned(),
            message: format!("expected one of tracing, memory, both; got '{raw}'"),
        })?;
        count = count.saturating_add(1);
        debug!(var = AUDIT_SINK_VAR, "applying env override");
    }

    Ok(count)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_no_vars_no_changes() {
        let mut config = Config::default();
        let applied = apply_env_overrides(&mut config, &env(&[])).unwrap();
        assert_eq!(applied, 0);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let vars = env(&[
            (LOG_LEVEL_VAR, "debug"),
            (LOG_FORMAT_VAR, "json"),
            (AUDIT_ENABLED_VAR, "off"),
            (AUDIT_SINK_VAR, "both"),
            ("UNRELATED", "x"),
        ]);

        let applied = apply_env_overrides(&mut config, &vars).unwrap();
        assert_eq!(applied, 4);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert!(!config.audit.enabled);
        assert_eq!(config.audit.sink, AuditSink::Both);
    }

    #[test]
    fn test_bad_bool_rejected() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, &env(&[(AUDIT_ENABLED_VAR, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvError { var_name, .. } if var_name == AUDIT_ENABLED_VAR));
    }

    #[test]
    fn test_bad_sink_rejected() {
        let mut config = Config::default();
        let err =
            apply_env_overrides(&mut config, &env(&[(AUDIT_SINK_VAR, "syslog")])).unwrap_err();
        assert!(err.to_string().contains("syslog"));
    }
}
