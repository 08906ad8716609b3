//! Configuration loading.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::Path;

use tracing::debug;

use crate::env::apply_env_overrides;
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate::validate;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Parse and validate a configuration from a TOML string.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the string cannot be parsed or fails
/// validation.
pub fn from_toml_str(content: &str) -> ConfigResult<Config> {
    let config = parse(content, "<string>")?;
    validate(&config)?;
    Ok(config)
}

/// Load a config from a specific file path (no environment overrides).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let config = read_file(path)?;
    validate(&config)?;
    Ok(config)
}

/// Load from `path` (or defaults when `None`), then apply overrides from
/// the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be loaded, an environment
/// variable is malformed, or the result fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<Config> {
    let env_vars: HashMap<String, String> = std::env::vars().collect();
    load_with_env(path, &env_vars)
}

/// Like [`load`], with an explicit environment map.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: BuildHasher>(
    path: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Config> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => {
            debug!("no config file given, using defaults");
            Config::default()
        },
    };

    let applied = apply_env_overrides(&mut config, env_vars)?;
    if applied > 0 {
        debug!(applied, "environment overrides applied");
    }

    validate(&config)?;
    Ok(config)
}

fn read_file(path: &Path) -> ConfigResult<Config> {
    // Check file size before reading to prevent OOM.
    let metadata = std::fs::metadata(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::validation(
            path.display().to_string(),
            format!(
                "config file is {} bytes, exceeding the {} byte limit",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        ));
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    debug!(path = %path.display(), "loaded config file");
    parse(&content, &path.display().to_string())
}

fn parse(content: &str, origin: &str) -> ConfigResult<Config> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuditSink;
    use capgate_core::Effect;
    use std::io::Write;

    const SAMPLE: &str = r#"
[logging]
level = "debug"
format = "json"
directives = ["capgate_policy=trace"]

[audit]
sink = "both"
memory_capacity = 16

[matcher]
cache_capacity = 0

[[principals]]
id = "svc-reporting"
policies = [
  { effect = "allow",  resource = "users/*", action = "read" },
  { effect = "modify", resource = "users/*", action = "read", modifier = "redact", arg = { fields = ["email"] } },
]
"#;

    #[test]
    fn test_parse_sample() {
        let config = from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directives, vec!["capgate_policy=trace"]);
        assert_eq!(config.audit.sink, AuditSink::Both);
        assert!(config.audit.enabled);
        assert_eq!(config.matcher.cache_capacity, 0);

        let principal = config.principal("svc-reporting").unwrap();
        assert_eq!(principal.policies().len(), 2);
        assert_eq!(principal.policies()[1].effect(), Effect::Modify);
        let (code, arg) = principal.policies()[1].modifier().unwrap();
        assert_eq!(code, "redact");
        assert_eq!(arg, Some(&serde_json::json!({"fields": ["email"]})));
    }

    #[test]
    fn test_empty_string_gives_defaults() {
        assert_eq!(from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_error_reports_origin() {
        let err = from_toml_str("[logging\nlevel=").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { ref path, .. } if path == "<string>"));
    }

    #[test]
    fn test_unknown_effect_is_parse_error() {
        let err = from_toml_str(
            r#"
[[principals]]
id = "svc"
policies = [{ effect = "maybe", resource = "a", action = "b" }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = load_file(file.path()).unwrap();
        assert_eq!(config.principals.len(), 1);
    }

    #[test]
    fn test_load_file_nonexistent() {
        let err = load_file(Path::new("/nonexistent/capgate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_load_without_file_uses_env() {
        let env: HashMap<String, String> =
            [("CAPGATE_AUDIT_SINK".to_owned(), "memory".to_owned())].into();
        let config = load_with_env(None, &env).unwrap();
        assert_eq!(config.audit.sink, AuditSink::Memory);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let env: HashMap<String, String> =
            [("CAPGATE_LOG_LEVEL".to_owned(), "warn".to_owned())].into();
        let config = load_with_env(Some(file.path()), &env).unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_env_result_is_validated() {
        let env: HashMap<String, String> =
            [("CAPGATE_LOG_FORMAT".to_owned(), "xml".to_owned())].into();
        let err = load_with_env(None, &env).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
