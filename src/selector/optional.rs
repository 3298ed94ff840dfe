use super::DependencySelector;
use crate::config::ApplicationConfig;
use crate::model::DependencyNode;

/// Drops optional edges unless the artifact declaring them asks for them.
///
/// The declared dependencies of the root are always selected. Below that, an
/// optional edge survives only when the configuration entry of its parent sets
/// `includeOptional`. The decision is made per path: an artifact rejected as
/// optional under one parent is still selected under another.
#[derive(Debug, Clone)]
pub struct OptionalSelector<'a> {
    config: &'a ApplicationConfig,
    depth: usize,
    include_optional: bool,
}

impl<'a> OptionalSelector<'a> {
    #[must_use]
    pub const fn new(config: &'a ApplicationConfig) -> Self {
        Self {
            config,
            depth: 0,
            include_optional: false,
        }
    }
}

impl DependencySelector for OptionalSelector<'_> {
    fn select_dependency(&self, edge: &DependencyNode) -> bool {
        self.depth <= 1 || !edge.optional || self.include_optional
    }

    fn derive_child_selector(&self, node: &DependencyNode) -> Self {
        let include_optional = node
            .coordinate
            .as_ref()
            .is_some_and(|c| self.config.includes_optional(&c.key()));
        Self {
            config: self.config,
            depth: self.depth + 1,
            include_optional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    fn node(artifact: &str) -> DependencyNode {
        DependencyNode::artifact(Coordinate::new("g", artifact, "1"))
    }

    #[test]
    fn test_declared_optional_dependency_selected() {
        let config = ApplicationConfig::default();
        let selector = OptionalSelector::new(&config).derive_child_selector(&DependencyNode::root());
        assert!(selector.select_dependency(&node("a").with_optional(true)));
    }

    #[test]
    fn test_transitive_optional_needs_parent_opt_in() {
        let mut config = ApplicationConfig::from_yaml(
            "artifacts:\n  - coord: g:wants\n    includeOptional: true\n",
        )
        .unwrap();
        config.validate().unwrap();
        let top = OptionalSelector::new(&config).derive_child_selector(&DependencyNode::root());

        let under_plain = top.derive_child_selector(&node("plain"));
        assert!(!under_plain.select_dependency(&node("x").with_optional(true)));
        assert!(under_plain.select_dependency(&node("x")));

        let under_wants = top.derive_child_selector(&node("wants"));
        assert!(under_wants.select_dependency(&node("x").with_optional(true)));

        // the opt-in does not extend to grandchildren
        let below = under_wants.derive_child_selector(&node("x"));
        assert!(!below.select_dependency(&node("y").with_optional(true)));
    }
}
