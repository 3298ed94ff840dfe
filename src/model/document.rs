//! Loading the resolver's output from a JSON document.
//!
//! The resolution engine runs out of process; it hands over the tree it built as
//! a JSON document:
//!
//! ```json
//! {
//!   "root": {
//!     "children": [
//!       {
//!         "coordinate": "com.example:myapp:jar:1.0",
//!         "scope": "compile",
//!         "file": "repository/com/example/myapp/1.0/myapp-1.0.jar",
//!         "children": [
//!           { "coordinate": "com.example:rtA:jar:32.0", "duplicateOf": "com.example:rtA:jar:33.0" }
//!         ]
//!       }
//!     ]
//!   },
//!   "problems": [
//!     { "coordinate": "com.example:old:pom:1.0", "kind": "missingPom", "message": "not found" }
//!   ]
//! }
//! ```
//!
//! Relative file paths are resolved against the document's directory.

use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::coordinate::{Coordinate, Scope};
use super::tree::{DependencyNode, NodeKind};
use crate::core::DepgenError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NodeDocument {
    #[serde(default)]
    coordinate: Option<Coordinate>,
    #[serde(default)]
    scope: Scope,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    sources_file: Option<PathBuf>,
    #[serde(default)]
    pom_file: Option<PathBuf>,
    #[serde(default)]
    duplicate_of: Option<Coordinate>,
    #[serde(default)]
    children: Vec<NodeDocument>,
}

impl NodeDocument {
    fn into_node(self, base_dir: &Path) -> DependencyNode {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base_dir.join(p) };
        DependencyNode {
            coordinate: self.coordinate,
            scope: self.scope,
            optional: self.optional,
            kind: self.duplicate_of.map_or(NodeKind::Resolved, NodeKind::DuplicateOf),
            file: self.file.map(resolve),
            sources_file: self.sources_file.map(resolve),
            pom_file: self.pom_file.map(resolve),
            children: self.children.into_iter().map(|c| c.into_node(base_dir)).collect(),
        }
    }
}

/// Category of a problem the resolver reported while reading artifact descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProblemKind {
    /// The artifact's POM could not be found
    MissingPom,
    /// The artifact's POM could not be parsed
    InvalidPom,
}

/// A resolution-boundary problem reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolutionProblem {
    /// Artifact the problem concerns
    pub coordinate: String,
    /// What went wrong
    pub kind: ProblemKind,
    /// Resolver message
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TreeDocument {
    root: NodeDocument,
    #[serde(default)]
    problems: Vec<ResolutionProblem>,
}

/// The resolver's output: the tree plus any descriptor problems it reported.
#[derive(Debug, Clone)]
pub struct ResolvedTree {
    /// Root of the resolved tree
    pub root: DependencyNode,
    /// Problems reported while building it
    pub problems: Vec<ResolutionProblem>,
}

impl ResolvedTree {
    /// Read a tree document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| DepgenError::TreeParseError {
            file: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&text, base_dir).map_err(|e| {
            anyhow::Error::from(DepgenError::TreeParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        })
    }

    /// Parse a tree document, resolving relative paths against `base_dir`.
    pub fn from_json(text: &str, base_dir: &Path) -> Result<Self, serde_json::Error> {
        let document: TreeDocument = serde_json::from_str(text)?;
        let root = document.root.into_node(base_dir);
        debug!("Loaded resolved tree with {} nodes", root.node_count());
        Ok(Self {
            root,
            problems: document.problems,
        })
    }

    /// Apply the failure policy to reported problems.
    ///
    /// Every problem is logged. The first problem whose kind is escalated by the
    /// policy ends the run; the rest are deferred and generation continues.
    pub fn check_problems(&self, fail_on_missing_pom: bool, fail_on_invalid_pom: bool) -> Result<()> {
        for problem in &self.problems {
            warn!(
                "Resolution problem for {} ({:?}): {}",
                problem.coordinate, problem.kind, problem.message
            );
            let fatal = match problem.kind {
                ProblemKind::MissingPom => fail_on_missing_pom,
                ProblemKind::InvalidPom => fail_on_invalid_pom,
            };
            if fatal {
                return Err(DepgenError::ResolutionProblem {
                    coordinate: problem.coordinate.clone(),
                    message: problem.message.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}
