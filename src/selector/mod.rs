//! Edge selection consulted while the dependency tree is built.
//!
//! The resolution engine asks a [`DependencySelector`] two questions as it
//! expands the tree:
//!
//! 1. [`select_dependency`](DependencySelector::select_dependency): should this
//!    child edge be part of the tree at all?
//! 2. [`derive_child_selector`](DependencySelector::derive_child_selector): which
//!    selector answers question 1 for the children of this node?
//!
//! Selectors are immutable values. Deriving returns a new selector, so the
//! decision for a node depends only on the path from the root to it; the same
//! artifact reached through two parents is judged twice, independently.
//!
//! A selector that reaches its terminal *rejected* state stays there: every
//! selector derived from it rejects every edge. This is what keeps a truncated
//! subtree truncated no matter how deep the resolver goes.
//!
//! # Selectors
//!
//! - [`ScopeSelector`] - stop below `provided`, `test`, `system` and `import` edges
//! - [`OptionalSelector`] - drop optional edges unless the parent asks for them
//! - [`ReplacementSelector`] - keep a replaced artifact, drop its dependencies
//! - [`ExclusionSelector`] - drop globally and per-artifact excluded edges
//!
//! [`SelectorChain`] combines all four with [`AndSelector`].
//!
//! # Examples
//!
//! ```rust
//! use bazel_depgen::config::ApplicationConfig;
//! use bazel_depgen::model::{Coordinate, DependencyNode, Scope};
//! use bazel_depgen::selector::{SelectorChain, prune};
//!
//! let config = ApplicationConfig::default();
//! let tree = DependencyNode::root().with_child(
//!     DependencyNode::artifact(Coordinate::new("com.example", "app", "1.0")).with_child(
//!         DependencyNode::artifact(Coordinate::new("junit", "junit", "4.13"))
//!             .with_scope(Scope::Test)
//!             .with_child(DependencyNode::artifact(Coordinate::new("org.hamcrest", "core", "1.3"))),
//!     ),
//! );
//!
//! let pruned = prune(&tree, &SelectorChain::for_config(&config));
//! let junit = &pruned.children[0].children[0];
//! assert!(junit.children.is_empty());
//! ```

mod exclusion;
mod optional;
mod replacement;
mod scope;

pub use exclusion::ExclusionSelector;
pub use optional::OptionalSelector;
pub use replacement::ReplacementSelector;
pub use scope::ScopeSelector;

use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::config::ApplicationConfig;
use crate::model::{ArtifactKey, DependencyNode, NodeKind};

/// Decides which edges of the dependency tree are traversed.
pub trait DependencySelector {
    /// Whether the child edge `edge` belongs in the tree.
    fn select_dependency(&self, edge: &DependencyNode) -> bool;

    /// Selector used for the children of `node`.
    #[must_use]
    fn derive_child_selector(&self, node: &DependencyNode) -> Self
    where
        Self: Sized;
}

/// Selects an edge only when both selectors do.
#[derive(Debug, Clone)]
pub struct AndSelector<A, B> {
    first: A,
    second: B,
}

impl<A, B> AndSelector<A, B> {
    pub const fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
        }
    }
}

impl<A: DependencySelector, B: DependencySelector> DependencySelector for AndSelector<A, B> {
    fn select_dependency(&self, edge: &DependencyNode) -> bool {
        self.first.select_dependency(edge) && self.second.select_dependency(edge)
    }

    fn derive_child_selector(&self, node: &DependencyNode) -> Self {
        Self::new(self.first.derive_child_selector(node), self.second.derive_child_selector(node))
    }
}

type Chain<'a> = AndSelector<
    AndSelector<AndSelector<ScopeSelector, OptionalSelector<'a>>, ReplacementSelector<'a>>,
    ExclusionSelector<'a>,
>;

/// The selector the generator registers with the resolution engine.
#[derive(Debug, Clone)]
pub struct SelectorChain<'a> {
    inner: Chain<'a>,
}

impl<'a> SelectorChain<'a> {
    /// All four selectors, configured from `config`.
    #[must_use]
    pub fn for_config(config: &'a ApplicationConfig) -> Self {
        Self {
            inner: AndSelector::new(
                AndSelector::new(
                    AndSelector::new(ScopeSelector::new(), OptionalSelector::new(config)),
                    ReplacementSelector::new(config),
                ),
                ExclusionSelector::new(config),
            ),
        }
    }
}

impl DependencySelector for SelectorChain<'_> {
    fn select_dependency(&self, edge: &DependencyNode) -> bool {
        self.inner.select_dependency(edge)
    }

    fn derive_child_selector(&self, node: &DependencyNode) -> Self {
        Self {
            inner: self.inner.derive_child_selector(node),
        }
    }
}

/// Apply `selector` to an unfiltered tree the way the resolution engine does
/// while building it.
///
/// Used when the resolver hands over a tree that was expanded without the
/// generator's selectors, and by tests.
///
/// Conflicts in the input are already mediated. When selection drops every
/// node holding a winning version while a duplicate of it survives on another
/// path, the first surviving duplicate takes the winner's place: it gets the
/// winner's artifact and subtree, selected along the duplicate's path.
#[must_use]
pub fn prune<S: DependencySelector>(node: &DependencyNode, selector: &S) -> DependencyNode {
    let mut winners = HashMap::new();
    index_winners(node, &mut winners);

    let mut promote = HashSet::new();
    loop {
        let mut pass = Pass {
            winners: &winners,
            promote: &promote,
            seen: HashSet::new(),
            promoted: HashSet::new(),
        };
        let pruned = pass.prune(node, selector);
        let orphans: Vec<ArtifactKey> = orphaned_duplicates(&pruned)
            .into_iter()
            .filter(|key| winners.contains_key(key) && !promote.contains(key))
            .collect();
        if orphans.is_empty() {
            return pruned;
        }
        promote.extend(orphans);
    }
}

/// One pruning walk with a fixed set of keys to promote.
struct Pass<'t, 'p> {
    winners: &'p HashMap<ArtifactKey, &'t DependencyNode>,
    promote: &'p HashSet<ArtifactKey>,
    /// Keys with a resolved node emitted so far, pre-order
    seen: HashSet<ArtifactKey>,
    /// Keys whose duplicate was promoted in this pass
    promoted: HashSet<ArtifactKey>,
}

impl Pass<'_, '_> {
    fn prune<S: DependencySelector>(
        &mut self,
        node: &DependencyNode,
        selector: &S,
    ) -> DependencyNode {
        let child_selector = selector.derive_child_selector(node);
        let mut children = Vec::new();
        for child in &node.children {
            if child_selector.select_dependency(child) {
                children.push(self.prune_edge(child, &child_selector));
            } else if let Some(coordinate) = &child.coordinate {
                trace!("Edge to {coordinate} rejected by selector");
            }
        }

        DependencyNode {
            coordinate: node.coordinate.clone(),
            scope: node.scope,
            optional: node.optional,
            kind: node.kind.clone(),
            file: node.file.clone(),
            sources_file: node.sources_file.clone(),
            pom_file: node.pom_file.clone(),
            children,
        }
    }

    /// Prune the selected edge `edge`, promoting or demoting it when needed.
    fn prune_edge<S: DependencySelector>(
        &mut self,
        edge: &DependencyNode,
        selector: &S,
    ) -> DependencyNode {
        let Some(coordinate) = &edge.coordinate else {
            return self.prune(edge, selector);
        };
        let key = coordinate.key();
        match &edge.kind {
            NodeKind::DuplicateOf(_)
                if self.promote.contains(&key) && !self.seen.contains(&key) =>
            {
                if let Some(winner) = self.winners.get(&key).copied() {
                    debug!("Promoting {coordinate}: no winning node of {key} was selected");
                    self.seen.insert(key.clone());
                    self.promoted.insert(key);
                    let promoted = DependencyNode {
                        scope: edge.scope,
                        optional: edge.optional,
                        ..winner.clone()
                    };
                    return self.prune(&promoted, selector);
                }
            }
            NodeKind::Resolved if self.promoted.contains(&key) => {
                // already stands in for the winner earlier in the tree
                return DependencyNode {
                    coordinate: Some(coordinate.clone()),
                    scope: edge.scope,
                    optional: edge.optional,
                    kind: NodeKind::DuplicateOf(coordinate.clone()),
                    file: edge.file.clone(),
                    sources_file: edge.sources_file.clone(),
                    pom_file: edge.pom_file.clone(),
                    children: Vec::new(),
                };
            }
            NodeKind::Resolved => {
                self.seen.insert(key);
            }
            NodeKind::DuplicateOf(_) => {}
        }
        self.prune(edge, selector)
    }
}

/// First resolved node of every `group:artifact`, pre-order.
fn index_winners<'t>(
    node: &'t DependencyNode,
    winners: &mut HashMap<ArtifactKey, &'t DependencyNode>,
) {
    if let Some(coordinate) = &node.coordinate
        && !node.is_duplicate()
    {
        winners.entry(coordinate.key()).or_insert(node);
    }
    for child in &node.children {
        index_winners(child, winners);
    }
}

/// Keys of traversed duplicates with no resolved node anywhere in `tree`.
fn orphaned_duplicates(tree: &DependencyNode) -> Vec<ArtifactKey> {
    fn walk(
        node: &DependencyNode,
        resolved: &mut HashSet<ArtifactKey>,
        duplicates: &mut Vec<ArtifactKey>,
    ) {
        if let Some(coordinate) = &node.coordinate {
            if !node.is_duplicate() {
                resolved.insert(coordinate.key());
            } else if node.scope.is_traversed() {
                duplicates.push(coordinate.key());
            }
        }
        for child in &node.children {
            walk(child, resolved, duplicates);
        }
    }

    let mut resolved = HashSet::new();
    let mut duplicates = Vec::new();
    walk(tree, &mut resolved, &mut duplicates);
    let mut orphans: Vec<ArtifactKey> = Vec::new();
    for key in duplicates {
        if !resolved.contains(&key) && !orphans.contains(&key) {
            orphans.push(key);
        }
    }
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactKey, Coordinate, NodeKind, Scope};

    fn node(artifact: &str) -> DependencyNode {
        DependencyNode::artifact(Coordinate::new("com.example", artifact, "1.0"))
    }

    fn names(node: &DependencyNode, out: &mut Vec<String>) {
        if let Some(c) = &node.coordinate {
            out.push(c.artifact_id.clone());
        }
        for child in &node.children {
            names(child, out);
        }
    }

    fn all_names(node: &DependencyNode) -> Vec<String> {
        let mut out = Vec::new();
        names(node, &mut out);
        out
    }

    fn config(yaml: &str) -> ApplicationConfig {
        let mut config = ApplicationConfig::from_yaml(yaml).unwrap();
        config.validate().unwrap();
        config
    }

    /// Rejects edges named `blocked` and becomes terminally rejected below `stop`.
    #[derive(Clone)]
    struct NameSelector {
        rejected: bool,
    }

    impl DependencySelector for NameSelector {
        fn select_dependency(&self, edge: &DependencyNode) -> bool {
            !self.rejected
                && edge.coordinate.as_ref().is_none_or(|c| c.artifact_id != "blocked")
        }

        fn derive_child_selector(&self, node: &DependencyNode) -> Self {
            Self {
                rejected: self.rejected
                    || node.coordinate.as_ref().is_some_and(|c| c.artifact_id == "stop"),
            }
        }
    }

    #[test]
    fn test_and_selector_requires_both() {
        let tree = DependencyNode::root()
            .with_child(node("blocked"))
            .with_child(node("a").with_scope(Scope::Test).with_child(node("b")))
            .with_child(node("c"));
        let selector = AndSelector::new(
            NameSelector {
                rejected: false,
            },
            ScopeSelector::new(),
        );
        assert_eq!(all_names(&prune(&tree, &selector)), vec!["a", "c"]);
    }

    #[test]
    fn test_rejection_is_inherited_by_all_descendants() {
        let tree = DependencyNode::root().with_child(
            node("stop").with_child(node("x").with_child(node("y").with_child(node("z")))),
        );
        let pruned = prune(
            &tree,
            &NameSelector {
                rejected: false,
            },
        );
        assert_eq!(all_names(&pruned), vec!["stop"]);

        let rejected = NameSelector {
            rejected: true,
        };
        let mut current = rejected.clone();
        for artifact in ["a", "b", "c"] {
            assert!(!current.select_dependency(&node(artifact)));
            current = current.derive_child_selector(&node(artifact));
        }
    }

    #[test]
    fn test_chain_applies_every_selector() {
        let config = config(
            r#"
artifacts:
  - coord: com.example:app
    excludes: [com.example:unwanted]
excludes:
  - coord: com.example:banned
replacements:
  - coord: com.example:replaced
    target: "//lib:replaced"
"#,
        );
        let tree = DependencyNode::root().with_child(
            node("app")
                .with_child(node("lib").with_child(node("opt").with_optional(true)))
                .with_child(node("replaced").with_child(node("hidden")))
                .with_child(node("unwanted"))
                .with_child(node("banned"))
                .with_child(
                    node("tool").with_scope(Scope::Provided).with_child(node("tool-dep")),
                ),
        );

        let pruned = prune(&tree, &SelectorChain::for_config(&config));
        assert_eq!(all_names(&pruned), vec!["app", "lib", "replaced", "tool"]);
    }

    #[test]
    fn test_optional_reevaluated_per_path() {
        let config = config("artifacts:\n  - coord: com.example:b\n    includeOptional: true\n");
        // shared is optional under a, but b asks for its optionals
        let tree = DependencyNode::root()
            .with_child(node("a").with_child(node("shared").with_optional(true)))
            .with_child(node("b").with_child(node("shared").with_optional(true)));

        let pruned = prune(&tree, &SelectorChain::for_config(&config));
        assert!(pruned.children[0].children.is_empty());
        assert_eq!(pruned.children[1].children.len(), 1);
        assert!(all_names(&pruned).contains(&"shared".to_string()));
    }

    /// a -> shared (optional, winner) -> shared-dep, b -> c -> shared (duplicate)
    fn mediated_optional_winner(winner_optional: bool) -> DependencyNode {
        let shared = Coordinate::new("com.example", "shared", "1.0");
        DependencyNode::root()
            .with_child(node("a").with_child(
                node("shared").with_optional(winner_optional).with_child(node("shared-dep")),
            ))
            .with_child(
                node("b").with_child(node("c").with_child(node("shared").duplicate_of(shared))),
            )
    }

    #[test]
    fn test_duplicate_promoted_when_winner_not_selected() {
        let config = config("");
        let pruned = prune(&mediated_optional_winner(true), &SelectorChain::for_config(&config));

        assert!(pruned.children[0].children.is_empty());
        let promoted = &pruned.children[1].children[0].children[0];
        assert_eq!(promoted.kind, NodeKind::Resolved);
        assert!(!promoted.optional);
        assert_eq!(all_names(promoted), vec!["shared", "shared-dep"]);
        assert_eq!(all_names(&pruned), vec!["a", "b", "c", "shared", "shared-dep"]);
    }

    #[test]
    fn test_duplicate_kept_when_winner_selected() {
        let config = config("");
        let pruned = prune(&mediated_optional_winner(false), &SelectorChain::for_config(&config));

        assert_eq!(pruned.children[0].children[0].kind, NodeKind::Resolved);
        let duplicate = &pruned.children[1].children[0].children[0];
        assert!(duplicate.is_duplicate());
        assert!(duplicate.children.is_empty());
    }

    #[test]
    fn test_only_first_duplicate_promoted() {
        let config = config("");
        let shared = Coordinate::new("com.example", "shared", "1.0");
        let tree = DependencyNode::root()
            .with_child(node("a").with_child(node("shared").with_optional(true)))
            .with_child(node("b").with_child(node("shared").duplicate_of(shared.clone())))
            .with_child(node("c").with_child(node("shared").duplicate_of(shared)));

        let pruned = prune(&tree, &SelectorChain::for_config(&config));
        assert_eq!(pruned.children[1].children[0].kind, NodeKind::Resolved);
        assert!(pruned.children[2].children[0].is_duplicate());
    }

    #[test]
    fn test_replacement_edge_kept_children_dropped() {
        let config =
            config("replacements:\n  - coord: com.example:mylib\n    target: //x:mylib\n");
        let tree = DependencyNode::root().with_child(
            node("myapp").with_child(node("mylib").with_child(node("rtB").with_scope(Scope::Runtime))),
        );
        let pruned = prune(&tree, &SelectorChain::for_config(&config));
        let mylib = &pruned.children[0].children[0];
        assert_eq!(mylib.coordinate.as_ref().map(Coordinate::key), Some(ArtifactKey::new("com.example", "mylib")));
        assert!(mylib.children.is_empty());
    }
}
