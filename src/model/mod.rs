//! Data model shared with the resolution engine.
//!
//! - [`Coordinate`], [`ArtifactKey`], [`Scope`] - artifact identity and edge scope
//! - [`DependencyNode`], [`NodeKind`], [`DependencyVisitor`] - the resolved tree and
//!   the protocol for walking it
//! - [`ResolvedTree`] - the resolver's output as read from disk

pub mod coordinate;
pub mod document;
pub mod tree;

pub use coordinate::{ArtifactKey, Coordinate, SOURCES_CLASSIFIER, Scope};
pub use document::{ProblemKind, ResolutionProblem, ResolvedTree};
pub use tree::{DependencyNode, DependencyVisitor, NodeKind};
