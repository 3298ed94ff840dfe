use tracing::trace;

use super::DependencySelector;
use crate::config::ApplicationConfig;
use crate::model::DependencyNode;

/// Keeps a replaced artifact as a dependency of its parent but never traverses
/// into it: the replacement target supplies its own dependencies.
#[derive(Debug, Clone)]
pub struct ReplacementSelector<'a> {
    config: &'a ApplicationConfig,
    rejected: bool,
}

impl<'a> ReplacementSelector<'a> {
    #[must_use]
    pub const fn new(config: &'a ApplicationConfig) -> Self {
        Self {
            config,
            rejected: false,
        }
    }
}

impl DependencySelector for ReplacementSelector<'_> {
    fn select_dependency(&self, _edge: &DependencyNode) -> bool {
        !self.rejected
    }

    fn derive_child_selector(&self, node: &DependencyNode) -> Self {
        let replaced = node.coordinate.as_ref().is_some_and(|c| {
            let replaced = self.config.replacement(&c.key()).is_some();
            if replaced && !self.rejected {
                trace!("Not traversing below replaced artifact {c}");
            }
            replaced
        });
        Self {
            config: self.config,
            rejected: self.rejected || replaced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    #[test]
    fn test_replacement_truncates_subtree() {
        let mut config =
            ApplicationConfig::from_yaml("replacements:\n  - coord: g:r\n    target: //r\n").unwrap();
        config.validate().unwrap();
        let selector = ReplacementSelector::new(&config);
        let replaced = DependencyNode::artifact(Coordinate::new("g", "r", "1"));
        let other = DependencyNode::artifact(Coordinate::new("g", "o", "1"));

        assert!(selector.select_dependency(&replaced));
        let below = selector.derive_child_selector(&replaced);
        assert!(!below.select_dependency(&other));
        assert!(!below.derive_child_selector(&other).select_dependency(&other));
        assert!(selector.derive_child_selector(&other).select_dependency(&other));
    }
}
