//! Memoizing pattern matcher.

use dashmap::DashMap;
use std::sync::Arc;

use capgate_core::ResourcePath;

use crate::glob::Glob;

/// Default number of compiled patterns kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Matches resource paths and action names against glob patterns.
///
/// Compiled patterns are shared across evaluations and threads. The cache is
/// bounded: once it holds `capacity` entries it is cleared before the next
/// insert. Compilation is pure, so a cache miss only costs time.
#[derive(Debug)]
pub struct PathMatcher {
    cache: DashMap<String, Arc<Glob>>,
    capacity: usize,
}

impl PathMatcher {
    /// Create a matcher with the default cache capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a matcher caching at most `capacity` patterns. Zero disables caching.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: DashMap::new(),
            capacity,
        }
    }

    /// Compile a pattern, reusing a cached compilation when available.
    #[must_use]
    pub fn compile(&self, pattern: &str) -> Arc<Glob> {
        if let Some(glob) = self.cache.get(pattern) {
            return Arc::clone(glob.value());
        }

        let glob = Arc::new(Glob::new(pattern));
        if self.capacity == 0 {
            return glob;
        }

        if self.cache.len() >= self.capacity {
            tracing::debug!(
                capacity = self.capacity,
                "Pattern cache full, clearing"
            );
            self.cache.clear();
        }
        self.cache.insert(pattern.to_string(), Arc::clone(&glob));
        glob
    }

    /// Check a candidate string against a pattern.
    #[must_use]
    pub fn matches(&self, candidate: &str, pattern: &str) -> bool {
        if Glob::is_literal_pattern(pattern) {
            return candidate == pattern;
        }
        self.compile(pattern).is_match(candidate)
    }

    /// Check a resource path against a pattern using its `/`-joined form.
    #[must_use]
    pub fn matches_path(&self, path: &ResourcePath, pattern: &str) -> bool {
        self.matches(&path.joined(), pattern)
    }

    /// Check an action name against a pattern.
    #[must_use]
    pub fn matches_action(&self, action: &str, pattern: &str) -> bool {
        self.matches(action, pattern)
    }

    /// Number of compiled patterns currently cached.
    #[must_use]
    pub fn cached_patterns(&self) -> usize {
        self.cache.len()
    }

    /// The configured cache capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new()
    }
}
