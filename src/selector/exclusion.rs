use tracing::trace;

use super::DependencySelector;
use crate::config::ApplicationConfig;
use crate::model::{ArtifactKey, DependencyNode};

/// Drops excluded edges.
///
/// Global excludes apply everywhere. Excludes declared on an artifact apply to
/// its whole subtree, the way Maven `<exclusions>` do.
#[derive(Debug, Clone)]
pub struct ExclusionSelector<'a> {
    config: &'a ApplicationConfig,
    inherited: Vec<ArtifactKey>,
}

impl<'a> ExclusionSelector<'a> {
    #[must_use]
    pub const fn new(config: &'a ApplicationConfig) -> Self {
        Self {
            config,
            inherited: Vec::new(),
        }
    }
}

impl DependencySelector for ExclusionSelector<'_> {
    fn select_dependency(&self, edge: &DependencyNode) -> bool {
        let Some(coordinate) = &edge.coordinate else {
            return true;
        };
        let key = coordinate.key();
        let excluded = self.config.is_excluded(&key) || self.inherited.contains(&key);
        if excluded {
            trace!("Excluding {coordinate}");
        }
        !excluded
    }

    fn derive_child_selector(&self, node: &DependencyNode) -> Self {
        let mut inherited = self.inherited.clone();
        if let Some(coordinate) = &node.coordinate
            && let Some(artifact) = self.config.artifact(&coordinate.key())
        {
            inherited.extend(artifact.excludes.iter().filter(|k| !self.inherited.contains(k)).cloned());
        }
        Self {
            config: self.config,
            inherited,
        }
    }
}
