//! Required actions - the (path, action) pairs an invocation needs authorized.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::path::ResourcePath;

/// A single (path, action) pair that must be covered by a policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequiredAction {
    /// Resource path being acted on.
    pub path: ResourcePath,
    /// Action name (e.g. `read`, `write`).
    pub action: String,
}

impl RequiredAction {
    /// Create a required action.
    #[must_use]
    pub fn new(path: impl Into<ResourcePath>, action: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for RequiredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path, self.action)
    }
}

/// A path together with every action the invocation performs on it.
///
/// This is the shape resources return from action extraction; a multi-action
/// group is flattened into one [`RequiredAction`] per action before policy
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGroup {
    /// Resource path.
    pub path: ResourcePath,
    /// Actions performed on the path.
    pub actions: Vec<String>,
}

impl ActionGroup {
    /// Create an action group.
    #[must_use]
    pub fn new<I, S>(path: impl Into<ResourcePath>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    /// Flatten into individual required actions, preserving action order.
    pub fn flatten(self) -> impl Iterator<Item = RequiredAction> {
        let path = self.path;
        self.actions
            .into_iter()
            .map(move |action| RequiredAction::new(path.clone(), action))
    }

    /// Flatten a list of groups, preserving group order then action order.
    #[must_use]
    pub fn flatten_all(groups: impl IntoIterator<Item = Self>) -> Vec<RequiredAction> {
        groups.into_iter().flat_map(Self::flatten).collect()
    }
}
