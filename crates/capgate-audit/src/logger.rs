//! The access logger trait and its stateless sinks.

use capgate_core::DenialReason;
use std::sync::Arc;

use crate::record::{AccessDecision, AccessRecord};

/// Tracing target for audit events.
pub const ACCESS_TARGET: &str = "capgate::access";

/// Sink for access records.
///
/// Implementations must be cheap and must not block: they run inline on the
/// invocation path after the decision is already final. A sink has no way to
/// influence an outcome and should swallow its own failures.
pub trait AccessLogger: Send + Sync {
    /// Record one decision.
    fn log(&self, record: AccessRecord);
}

impl<T: AccessLogger + ?Sized> AccessLogger for Arc<T> {
    fn log(&self, record: AccessRecord) {
        (**self).log(record);
    }
}

/// Emits records as `tracing` events under [`ACCESS_TARGET`].
///
/// Granted decisions log at info, denials at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAccessLogger;

impl TracingAccessLogger {
    /// Create a tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AccessLogger for TracingAccessLogger {
    fn log(&self, record: AccessRecord) {
        let policies: Vec<String> = record.policies.iter().map(ToString::to_string).collect();
        let reason = record.reason.map(DenialReason::code);

        match record.decision {
            AccessDecision::Denied => tracing::warn!(
                target: ACCESS_TARGET,
                invocation = %record.invocation,
                principal = %record.principal,
                resource = %record.resource,
                path = %record.path,
                action = %record.action,
                policies = ?policies,
                reason = reason,
                "Access denied"
            ),
            AccessDecision::Allowed | AccessDecision::Filtered => tracing::info!(
                target: ACCESS_TARGET,
                invocation = %record.invocation,
                principal = %record.principal,
                resource = %record.resource,
                path = %record.path,
                action = %record.action,
                policies = ?policies,
                decision = %record.decision,
                "Access granted"
            ),
        }
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAccessLogger;

impl AccessLogger for NullAccessLogger {
    fn log(&self, _record: AccessRecord) {}
}

/// Forwards each record to several sinks, in order.
#[derive(Clone, Default)]
pub struct FanoutAccessLogger {
    sinks: Vec<Arc<dyn AccessLogger>>,
}

impl FanoutAccessLogger {
    /// Create an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn AccessLogger>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for FanoutAccessLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutAccessLogger")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl AccessLogger for FanoutAccessLogger {
    fn log(&self, record: AccessRecord) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.log(record.clone());
            }
            last.log(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryAccessLog;
    use capgate_core::{InvocationId, PrincipalId};

    fn record(decision: AccessDecision) -> AccessRecord {
        AccessRecord::new(
            InvocationId::new(),
            PrincipalId::new("alice"),
            "users",
            "users/1",
            "read",
            decision,
        )
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = Arc::new(MemoryAccessLog::new(8));
        let second = Arc::new(MemoryAccessLog::new(8));
        let fanout = FanoutAccessLogger::new()
            .with_sink(first.clone())
            .with_sink(second.clone());

        fanout.log(record(AccessDecision::Allowed));
        fanout.log(record(AccessDecision::Denied));

        assert_eq!(fanout.len(), 2);
        assert_eq!(first.len(), 2);
        assert_eq!(second.count(AccessDecision::Denied), 1);
    }

    #[test]
    fn test_empty_fanout_is_noop() {
        let fanout = FanoutAccessLogger::new();
        assert!(fanout.is_empty());
        fanout.log(record(AccessDecision::Allowed));
    }

    #[test]
    fn test_tracing_and_null_sinks_accept_records() {
        TracingAccessLogger::new().log(record(AccessDecision::Denied));
        TracingAccessLogger::new().log(record(AccessDecision::Filtered));
        NullAccessLogger.log(record(AccessDecision::Allowed));
    }

    #[test]
    fn test_arc_forwards() {
        let log = Arc::new(MemoryAccessLog::new(4));
        let shared: Arc<dyn AccessLogger> = log.clone();
        shared.log(record(AccessDecision::Allowed));
        assert_eq!(log.len(), 1);
    }
}
