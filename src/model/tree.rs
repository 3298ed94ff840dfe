//! The resolved dependency tree and the visitor protocol used to walk it.
//!
//! Trees are produced by the external resolution engine. A node either holds the
//! artifact the resolver selected ([`NodeKind::Resolved`]) or marks a losing
//! duplicate path that points at the conflict winner ([`NodeKind::DuplicateOf`]).
//! The winner marker is part of the node type rather than loose metadata, so
//! consumers never have to guess whether a subtree was already materialized.

use std::path::{Path, PathBuf};

use super::coordinate::{Coordinate, Scope};

/// Whether a node carries the winning artifact of its `group:artifact` or is a
/// losing duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    /// The node holds the artifact selected by version mediation.
    #[default]
    Resolved,
    /// The node lost version mediation; the coordinate is the winner's.
    DuplicateOf(Coordinate),
}

/// One node of the resolved dependency tree.
///
/// The root of a tree returned by the resolver is usually synthetic: it has no
/// coordinate and its children are the user's declared dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyNode {
    /// Artifact coordinate, `None` for the synthetic root
    pub coordinate: Option<Coordinate>,
    /// Scope of the edge leading to this node
    pub scope: Scope,
    /// Whether the edge leading to this node is optional
    pub optional: bool,
    /// Resolved or losing duplicate
    pub kind: NodeKind,
    /// Local file the artifact resolved to
    pub file: Option<PathBuf>,
    /// Local file of the companion sources artifact, if it was resolved
    pub sources_file: Option<PathBuf>,
    /// Local POM file of the artifact, if it was resolved
    pub pom_file: Option<PathBuf>,
    /// Child edges in declaration order
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    /// A synthetic root with no artifact.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A resolved node for `coordinate` with unspecified scope.
    #[must_use]
    pub fn artifact(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_sources_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.sources_file = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_pom_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.pom_file = Some(file.into());
        self
    }

    /// Mark this node as a losing duplicate of `winner`.
    #[must_use]
    pub fn duplicate_of(mut self, winner: Coordinate) -> Self {
        self.kind = NodeKind::DuplicateOf(winner);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: DependencyNode) -> Self {
        self.children.push(child);
        self
    }

    /// Whether the node is a losing duplicate.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self.kind, NodeKind::DuplicateOf(_))
    }

    /// Resolved local file, if any.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Walk the subtree rooted at this node, pre-order.
    ///
    /// Children are visited only when [`DependencyVisitor::visit_enter`] returns
    /// `true`. Siblings are skipped once [`DependencyVisitor::visit_leave`]
    /// returns `false`. The return value is the result of `visit_leave` for this
    /// node.
    pub fn accept<V: DependencyVisitor + ?Sized>(&self, visitor: &mut V) -> bool {
        if visitor.visit_enter(self) {
            for child in &self.children {
                if !child.accept(visitor) {
                    break;
                }
            }
        }
        visitor.visit_leave(self)
    }

    /// Total number of nodes in the subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

/// Callback protocol for walking a [`DependencyNode`] tree.
pub trait DependencyVisitor {
    /// Called before a node's children. Return `true` to descend into them.
    fn visit_enter(&mut self, node: &DependencyNode) -> bool;

    /// Called after a node's children. Return `false` to stop visiting siblings.
    fn visit_leave(&mut self, node: &DependencyNode) -> bool;
}
