use tracing::trace;

use super::DependencySelector;
use crate::model::DependencyNode;

/// Stops traversal below edges whose scope is not part of the build graph.
///
/// Edges of every scope are selected, so a `test` or `provided` dependency is
/// still visible as a child. Its own dependencies are never traversed.
#[derive(Debug, Clone, Default)]
pub struct ScopeSelector {
    rejected: bool,
}

impl ScopeSelector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rejected: false,
        }
    }
}

impl DependencySelector for ScopeSelector {
    fn select_dependency(&self, _edge: &DependencyNode) -> bool {
        !self.rejected
    }

    fn derive_child_selector(&self, node: &DependencyNode) -> Self {
        if self.rejected {
            return self.clone();
        }
        let rejected = !node.scope.is_traversed();
        if rejected && let Some(coordinate) = &node.coordinate {
            trace!("Not traversing below {coordinate} (scope {})", node.scope);
        }
        Self {
            rejected,
        }
    }
}
