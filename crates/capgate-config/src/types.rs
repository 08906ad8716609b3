//! Configuration types.
//!
//! Every struct implements [`Default`] so that a bare `[section]` header in
//! TOML (or no file at all) produces a working configuration.

use capgate_core::{Policy, Principal};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
    /// Access audit trail sinks.
    pub audit: AuditSection,
    /// Glob matcher tuning.
    pub matcher: MatcherSection,
    /// Static principal policy sets.
    pub principals: Vec<PrincipalSection>,
}

impl Config {
    /// Build a principal from its static policy set.
    ///
    /// Returns `None` when no principal with that id is configured.
    #[must_use]
    pub fn principal(&self, id: &str) -> Option<Principal> {
        self.principals
            .iter()
            .find(|p| p.id == id)
            .map(PrincipalSection::to_principal)
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["capgate_policy=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuditSection
// ---------------------------------------------------------------------------

/// Where access records go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSink {
    /// Emit `tracing` events.
    #[default]
    Tracing,
    /// Keep recent records in memory.
    Memory,
    /// Both of the above.
    Both,
}

impl AuditSink {
    /// Parse a sink name as used in TOML and environment variables.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tracing" => Some(Self::Tracing),
            "memory" => Some(Self::Memory),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Whether the tracing sink is included.
    #[must_use]
    pub fn uses_tracing(self) -> bool {
        matches!(self, Self::Tracing | Self::Both)
    }

    /// Whether the in-memory sink is included.
    #[must_use]
    pub fn uses_memory(self) -> bool {
        matches!(self, Self::Memory | Self::Both)
    }
}

impl fmt::Display for AuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracing => write!(f, "tracing"),
            Self::Memory => write!(f, "memory"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Access audit trail settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Whether access records are emitted at all.
    pub enabled: bool,
    /// Which sink(s) receive records.
    pub sink: AuditSink,
    /// Ring buffer size for the memory sink.
    pub memory_capacity: usize,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            enabled: true,
            sink: AuditSink::Tracing,
            memory_capacity: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// MatcherSection
// ---------------------------------------------------------------------------

/// Glob matcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSection {
    /// Number of compiled patterns to memoize. `0` disables caching.
    pub cache_capacity: usize,
}

impl Default for MatcherSection {
    fn default() -> Self {
        Self {
            cache_capacity: 4096,
        }
    }
}

// ---------------------------------------------------------------------------
// PrincipalSection
// ---------------------------------------------------------------------------

/// A statically configured principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrincipalSection {
    /// Principal identity.
    pub id: String,
    /// Ordered policy set.
    pub policies: Vec<Policy>,
}

impl PrincipalSection {
    /// Convert to a runtime principal.
    #[must_use]
    pub fn to_principal(&self) -> Principal {
        Principal::new(self.id.as_str(), self.policies.clone())
    }
}
