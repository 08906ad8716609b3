//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_config::prelude::*;` to import all essential types.

pub use crate::{
    AuditSection, AuditSink, Config, ConfigError, ConfigResult, LoggingSection, MatcherSection,
    PrincipalSection,
};
