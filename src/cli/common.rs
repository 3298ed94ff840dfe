//! Steps shared by the commands: loading inputs and collecting the graph.

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::cache::{HttpProbe, MetadataCache};
use crate::collector::ApplicationRecord;
use crate::config::{ApplicationConfig, AuthContexts};
use crate::constants::DEFAULT_TREE_FILE;
use crate::model::ResolvedTree;
use crate::selector::{SelectorChain, prune};

/// Input locations of one invocation.
#[derive(Debug, Clone)]
pub struct Session {
    config_file: PathBuf,
    tree: Option<PathBuf>,
}

impl Session {
    pub const fn new(config_file: PathBuf, tree: Option<PathBuf>) -> Self {
        Self {
            config_file,
            tree,
        }
    }

    /// Load and validate the configuration.
    pub fn load_config(&self) -> Result<ApplicationConfig> {
        ApplicationConfig::load(&self.config_file)
    }

    /// The tree given on the command line, or the default next to the configuration.
    #[must_use]
    pub fn tree_path(&self, config: &ApplicationConfig) -> PathBuf {
        self.tree.clone().unwrap_or_else(|| config.config_directory().join(DEFAULT_TREE_FILE))
    }

    /// A cache probing repositories over HTTP.
    pub fn metadata_cache(&self) -> Result<MetadataCache> {
        Ok(MetadataCache::new(Box::new(HttpProbe::new()?), AuthContexts::new()))
    }

    /// Load the tree, apply the failure policy and the selectors, and collect
    /// the artifact graph.
    pub fn collect(
        &self,
        config: &ApplicationConfig,
        cache: &mut MetadataCache,
    ) -> Result<ApplicationRecord> {
        let tree_path = self.tree_path(config);
        let tree = ResolvedTree::load(&tree_path)?;
        tree.check_problems(config.options.fail_on_missing_pom, config.options.fail_on_invalid_pom)?;

        let pruned = prune(&tree.root, &SelectorChain::for_config(config));
        let graph = ApplicationRecord::build(&pruned, config, cache)?;
        info!("Collected {} artifacts from {}", graph.len(), tree_path.display());
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_tree_path_defaults_next_to_config() {
        let mut config = ApplicationConfig::default();
        config.config_file = Some(PathBuf::from("project/dependencies.yml"));

        let session = Session::new(PathBuf::from("project/dependencies.yml"), None);
        assert_eq!(session.tree_path(&config), Path::new("project").join(DEFAULT_TREE_FILE));

        let session = Session::new(PathBuf::from("x.yml"), Some(PathBuf::from("t.json")));
        assert_eq!(session.tree_path(&config), PathBuf::from("t.json"));
    }
}
