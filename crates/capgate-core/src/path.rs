//! Hierarchical resource paths.
//!
//! A path is either a single string (`"users/123"`) or an ordered list of
//! segments (`["users", "123"]`). For matching purposes both forms are the
//! same `/`-joined string. Segments are never reordered or deduplicated.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Path separator used when joining segments.
pub const SEPARATOR: char = '/';

/// A resource path, as a single string or a segment sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourcePath {
    /// A path given as one string.
    Single(String),
    /// A path given as ordered segments.
    Segments(Vec<String>),
}

impl ResourcePath {
    /// Create a path from a single string.
    #[must_use]
    pub fn single(path: impl Into<String>) -> Self {
        Self::Single(path.into())
    }

    /// Create a path from segments.
    #[must_use]
    pub fn segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Segments(segments.into_iter().map(Into::into).collect())
    }

    /// The `/`-joined form used for matching.
    ///
    /// Borrows for single-string paths; allocates only for segment lists.
    #[must_use]
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            Self::Single(path) => Cow::Borrowed(path),
            Self::Segments(segments) => Cow::Owned(segments.join("/")),
        }
    }

    /// Whether the path has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(path) => path.is_empty(),
            Self::Segments(segments) => segments.iter().all(String::is_empty),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl From<&str> for ResourcePath {
    fn from(path: &str) -> Self {
        Self::Single(path.to_string())
    }
}

impl From<String> for ResourcePath {
    fn from(path: String) -> Self {
        Self::Single(path)
    }
}

impl From<Vec<String>> for ResourcePath {
    fn from(segments: Vec<String>) -> Self {
        Self::Segments(segments)
    }
}

impl From<Vec<&str>> for ResourcePath {
    fn from(segments: Vec<&str>) -> Self {
        Self::segments(segments)
    }
}

impl<const N: usize> From<[&str; N]> for ResourcePath {
    fn from(segments: [&str; N]) -> Self {
        Self::segments(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_path_joins_to_itself() {
        let path = ResourcePath::from("users/123");
        assert_eq!(path.joined(), "users/123");
        assert!(matches!(path.joined(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_segments_join_in_order() {
        let path = ResourcePath::from(["objects", "conversations", "42"]);
        assert_eq!(path.joined(), "objects/conversations/42");
    }

    #[test]
    fn test_segments_are_not_deduplicated() {
        let path = ResourcePath::segments(["a", "a", "b"]);
        assert_eq!(path.to_string(), "a/a/b");
    }

    #[test]
    fn test_deserialize_both_forms() {
        let single: ResourcePath = serde_json::from_str("\"users/1\"").unwrap();
        let segments: ResourcePath = serde_json::from_str("[\"users\", \"1\"]").unwrap();
        assert_eq!(single.joined(), segments.joined());
        assert!(matches!(segments, ResourcePath::Segments(_)));
    }

    #[test]
    fn test_is_empty() {
        assert!(ResourcePath::from("").is_empty());
        assert!(ResourcePath::Segments(Vec::new()).is_empty());
        assert!(!ResourcePath::from("x").is_empty());
    }
}
