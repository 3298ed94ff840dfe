//! Conversion of the resolved tree into the artifact graph.
//!
//! [`GraphCollector`] walks the tree once, pre-order, and materializes one
//! [`ArtifactRecord`] per `group:artifact`:
//!
//! 1. The synthetic root creates nothing; its children are visited
//! 2. A losing duplicate is linked to its parent but not descended into; the
//!    winner's subtree is materialized where the winner sits
//! 3. A replaced artifact becomes a replacement record and is not descended
//!    into
//! 4. An edge whose scope is not traversed is skipped
//! 5. Anything else becomes a resolved record, hashed and located through the
//!    [`MetadataCache`], and its children are visited
//!
//! Every child edge with a traversed scope is linked into its parent's compile
//! or runtime list by the child's scope.
//!
//! Before walking, [`ApplicationRecord::build`] checks that the tree marks
//! every conflict: an artifact resolved twice without a duplicate marker, or a
//! duplicate whose winner is missing, is reported as a resolution error
//! rather than producing a wrong graph.

mod record;

pub use record::{ApplicationRecord, ArtifactRecord, SourcesArtifact};

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, trace, warn};

use crate::cache::MetadataCache;
use crate::config::ApplicationConfig;
use crate::core::DepgenError;
use crate::model::{ArtifactKey, Coordinate, DependencyNode, DependencyVisitor, NodeKind, Scope};

impl ApplicationRecord {
    /// Collect the artifact graph of `tree`.
    pub fn build(
        tree: &DependencyNode,
        config: &ApplicationConfig,
        cache: &mut MetadataCache,
    ) -> Result<Self> {
        find_unmarked_conflicts(tree, config)?;
        let mut collector = GraphCollector::new(config, cache);
        tree.accept(&mut collector);
        collector.finish()
    }
}

enum Frame {
    /// Node without artifact
    Root,
    /// Node that produced a resolved record
    Record(ArtifactKey),
    /// Node whose children are not visited
    Stop,
}

/// Visitor building an [`ApplicationRecord`].
///
/// Errors met while materializing a record (missing file, artifact not in any
/// repository) stop the walk; [`finish`](Self::finish) returns the first one.
pub struct GraphCollector<'a> {
    config: &'a ApplicationConfig,
    cache: &'a mut MetadataCache,
    records: BTreeMap<ArtifactKey, ArtifactRecord>,
    roots: Vec<ArtifactKey>,
    stack: Vec<Frame>,
    error: Option<anyhow::Error>,
}

impl<'a> GraphCollector<'a> {
    pub fn new(config: &'a ApplicationConfig, cache: &'a mut MetadataCache) -> Self {
        Self {
            config,
            cache,
            records: BTreeMap::new(),
            roots: Vec::new(),
            stack: Vec::new(),
            error: None,
        }
    }

    /// The collected graph, or the error that stopped collection.
    ///
    /// # Panics
    ///
    /// If a record links to a key that was never collected.
    pub fn finish(self) -> Result<ApplicationRecord> {
        if let Some(error) = self.error {
            return Err(error);
        }
        for record in self.records.values() {
            for dep in record.compile_deps().iter().chain(record.runtime_deps()) {
                assert!(
                    self.records.contains_key(dep),
                    "{} depends on {dep}, which was never collected",
                    record.key()
                );
            }
        }
        debug!("Collected {} artifact records", self.records.len());
        Ok(ApplicationRecord {
            records: self.records,
            roots: self.roots,
        })
    }

    fn link(&mut self, key: &ArtifactKey, scope: Scope) {
        match self.stack.last() {
            Some(Frame::Record(parent)) => {
                let parent = parent.clone();
                if let Some(record) = self.records.get_mut(&parent) {
                    record.link(key.clone(), scope.is_runtime());
                }
            }
            Some(Frame::Root) | None => {
                if !self.roots.contains(key) {
                    self.roots.push(key.clone());
                }
            }
            Some(Frame::Stop) => {}
        }
    }

    fn insert(&mut self, record: ArtifactRecord) {
        let key = record.key().clone();
        assert!(!self.records.contains_key(&key), "artifact {key} collected twice");
        debug!("Collected {}", record.coordinate());
        self.records.insert(key, record);
    }

    fn enter_artifact(&mut self, node: &DependencyNode, coordinate: &Coordinate) -> Result<Frame> {
        let key = coordinate.key();
        if let NodeKind::DuplicateOf(winner) = &node.kind {
            trace!("{coordinate} lost conflict resolution to {winner}");
            return Ok(Frame::Stop);
        }
        if let Some(replacement) = self.config.replacement(&key) {
            self.insert(ArtifactRecord::replaced(coordinate.clone(), replacement.clone()));
            return Ok(Frame::Stop);
        }
        if !node.scope.is_traversed() {
            trace!("Skipping {coordinate} in scope {}", node.scope);
            return Ok(Frame::Stop);
        }

        let file = node.file().filter(|f| f.is_file()).ok_or_else(|| {
            DepgenError::ArtifactFileMissing {
                coordinate: coordinate.to_string(),
                path: node.file().map(|f| f.display().to_string()),
            }
        })?;
        let sha256 = self.cache.sha256(coordinate, file)?;
        let urls = self.cache.urls(coordinate, file, &self.config.repositories)?;
        let sources = match &node.sources_file {
            Some(sources_file) if self.config.include_source(&key) => {
                self.sources(coordinate, sources_file)?
            }
            _ => None,
        };

        self.insert(ArtifactRecord::resolved(
            coordinate.clone(),
            file,
            node.pom_file.as_deref(),
            sha256,
            urls,
            sources,
            self.config.artifact(&key).cloned(),
        ));
        Ok(Frame::Record(key))
    }

    fn sources(&mut self, coordinate: &Coordinate, file: &Path) -> Result<Option<SourcesArtifact>> {
        let sources = coordinate.sources();
        if !file.is_file() {
            warn!("Sources of {coordinate} missing at {}, skipping", file.display());
            return Ok(None);
        }
        let urls = self.cache.find_urls(&sources, file, &self.config.repositories)?;
        if urls.is_empty() {
            warn!("No repository serves {sources}, skipping sources");
            return Ok(None);
        }
        let sha256 = self.cache.sha256(&sources, file)?;
        Ok(Some(SourcesArtifact {
            coordinate: sources,
            sha256,
            urls,
        }))
    }
}

impl DependencyVisitor for GraphCollector<'_> {
    fn visit_enter(&mut self, node: &DependencyNode) -> bool {
        if self.error.is_some() {
            self.stack.push(Frame::Stop);
            return false;
        }
        let Some(coordinate) = &node.coordinate else {
            self.stack.push(Frame::Root);
            return true;
        };

        if node.scope.is_traversed() {
            self.link(&coordinate.key(), node.scope);
        }
        let frame = match self.enter_artifact(node, coordinate) {
            Ok(frame) => frame,
            Err(error) => {
                self.error = Some(error);
                Frame::Stop
            }
        };
        let descend = matches!(frame, Frame::Record(_));
        self.stack.push(frame);
        descend
    }

    fn visit_leave(&mut self, _node: &DependencyNode) -> bool {
        self.stack.pop();
        self.error.is_none()
    }
}

/// Check that the resolver marked every conflict in `tree`.
///
/// Walks the nodes the collector would materialize and fails if one
/// `group:artifact` is materialized twice, or if a losing duplicate points at
/// an artifact that is never materialized.
pub fn find_unmarked_conflicts(tree: &DependencyNode, config: &ApplicationConfig) -> Result<()> {
    let mut materialized = HashMap::new();
    let mut losers = Vec::new();
    walk_conflicts(tree, config, &mut materialized, &mut losers)?;

    for loser in losers {
        if !materialized.contains_key(&loser.key()) {
            return Err(DepgenError::ResolutionProblem {
                coordinate: loser.to_string(),
                message: "marked as a conflict loser but the winning version is not in the tree"
                    .to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn walk_conflicts<'t>(
    node: &'t DependencyNode,
    config: &ApplicationConfig,
    materialized: &mut HashMap<ArtifactKey, &'t Coordinate>,
    losers: &mut Vec<&'t Coordinate>,
) -> Result<()> {
    if let Some(coordinate) = &node.coordinate {
        if node.is_duplicate() {
            if node.scope.is_traversed() {
                losers.push(coordinate);
            }
            return Ok(());
        }
        let replaced = config.replacement(&coordinate.key()).is_some();
        if !replaced && !node.scope.is_traversed() {
            return Ok(());
        }
        if let Some(previous) = materialized.insert(coordinate.key(), coordinate) {
            return Err(DepgenError::ResolutionProblem {
                coordinate: coordinate.to_string(),
                message: format!(
                    "resolved twice (also as {previous}) without a conflict marker"
                ),
            }
            .into());
        }
        if replaced {
            return Ok(());
        }
    }
    for child in &node.children {
        walk_conflicts(child, config, materialized, losers)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthContexts;
    use crate::selector::{SelectorChain, prune};
    use crate::test_utils::{FakeProbe, LocalRepository, init_test_logging};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        repo: LocalRepository,
        config: ApplicationConfig,
        probe: FakeProbe,
    }

    impl Fixture {
        fn new(yaml: &str) -> Self {
            init_test_logging(None);
            let temp = TempDir::new().unwrap();
            let repo = LocalRepository::new(temp.path().join("repository"));
            let mut config = ApplicationConfig::from_yaml(yaml).unwrap();
            config.repositories = vec![crate::config::RepositoryConfig::new("central", "https://repo.example/")];
            config.validate().unwrap();
            Self {
                _temp: temp,
                repo,
                config,
                probe: FakeProbe::serving_everything(),
            }
        }

        fn node(&self, coordinate: &str) -> DependencyNode {
            self.repo.artifact(coordinate).unwrap()
        }

        fn build(&self, tree: &DependencyNode) -> Result<ApplicationRecord> {
            let mut cache = MetadataCache::new(Box::new(self.probe.clone()), AuthContexts::new());
            ApplicationRecord::build(tree, &self.config, &mut cache)
        }

        fn select_and_build(&self, tree: &DependencyNode) -> Result<ApplicationRecord> {
            self.build(&prune(tree, &SelectorChain::for_config(&self.config)))
        }
    }

    fn keys(keys: &[ArtifactKey]) -> Vec<String> {
        keys.iter().map(ToString::to_string).collect()
    }

    /// myapp -> mylib -> rtB (runtime), myapp -> rtA (runtime)
    fn scenario(f: &Fixture) -> DependencyNode {
        DependencyNode::root().with_child(
            f.node("com.example:myapp:1.0")
                .with_child(
                    f.node("com.example:mylib:1.0")
                        .with_scope(Scope::Compile)
                        .with_child(f.node("com.example:rtB:2.0").with_scope(Scope::Runtime)),
                )
                .with_child(f.node("com.example:rtA:33.0").with_scope(Scope::Runtime)),
        )
    }

    #[test]
    fn test_compile_and_runtime_partitioning() {
        let f = Fixture::new("");
        let graph = f.build(&scenario(&f)).unwrap();

        assert_eq!(graph.len(), 4);
        let myapp = graph.find_by_key("com.example", "myapp").unwrap();
        assert_eq!(keys(myapp.compile_deps()), vec!["com.example:mylib"]);
        assert_eq!(keys(myapp.runtime_deps()), vec!["com.example:rtA"]);
        let mylib = graph.find_by_key("com.example", "mylib").unwrap();
        assert!(mylib.compile_deps().is_empty());
        assert_eq!(keys(mylib.runtime_deps()), vec!["com.example:rtB"]);
        for leaf in ["rtA", "rtB"] {
            let record = graph.find_by_key("com.example", leaf).unwrap();
            assert!(record.compile_deps().is_empty() && record.runtime_deps().is_empty());
        }
        assert_eq!(keys(graph.roots()), vec!["com.example:myapp"]);
    }

    #[test]
    fn test_every_resolved_record_has_hash_and_urls() {
        let f = Fixture::new("");
        let graph = f.build(&scenario(&f)).unwrap();
        for record in graph.records() {
            assert_eq!(record.sha256().map(str::len), Some(64));
            assert_eq!(record.urls().len(), 1);
            assert!(record.urls()[0].starts_with("https://repo.example/com/example/"));
        }
    }

    #[test]
    fn test_conflict_winner_only() {
        let f = Fixture::new("");
        let winner: Coordinate = "com.example:rtA:33.0".parse().unwrap();
        let tree = DependencyNode::root().with_child(
            f.node("com.example:myapp:1.0")
                .with_child(
                    f.node("com.example:mylib:1.0").with_child(
                        f.node("com.example:rtA:32.0")
                            .with_scope(Scope::Runtime)
                            .duplicate_of(winner.clone())
                            .with_child(f.node("com.example:only-in-32:1.0")),
                    ),
                )
                .with_child(f.node("com.example:rtA:33.0").with_scope(Scope::Runtime)),
        );

        let graph = f.build(&tree).unwrap();
        assert_eq!(graph.len(), 3);
        let rta = graph.find_by_key("com.example", "rtA").unwrap();
        assert_eq!(rta.coordinate(), &winner);
        assert!(graph.find_by_key("com.example", "only-in-32").is_none());
        let mylib = graph.find_by_key("com.example", "mylib").unwrap();
        assert_eq!(keys(mylib.runtime_deps()), vec!["com.example:rtA"]);
    }

    #[test]
    fn test_replacement_record() {
        let f = Fixture::new(
            "replacements:\n  - coord: com.example:mylib\n    target: \"//third_party:mylib\"\n",
        );
        let graph = f.build(&scenario(&f)).unwrap();

        let mylib = graph.find_by_key("com.example", "mylib").unwrap();
        assert!(mylib.is_replacement());
        assert_eq!(mylib.replacement().map(|r| r.target.as_str()), Some("//third_party:mylib"));
        assert!(mylib.sha256().is_none());
        assert!(mylib.compile_deps().is_empty() && mylib.runtime_deps().is_empty());
        assert!(graph.find_by_key("com.example", "rtB").is_none());
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_untraversed_scopes_skipped() {
        let f = Fixture::new("");
        let tree = DependencyNode::root().with_child(
            f.node("com.example:myapp:1.0")
                .with_child(f.node("junit:junit:4.13").with_scope(Scope::Test))
                .with_child(f.node("javax.servlet:servlet-api:3.0").with_scope(Scope::Provided)),
        );
        let graph = f.build(&tree).unwrap();
        assert_eq!(graph.len(), 1);
        let myapp = graph.find_by_key("com.example", "myapp").unwrap();
        assert!(myapp.compile_deps().is_empty());
    }

    #[test]
    fn test_declared_config_attached() {
        let f = Fixture::new("artifacts:\n  - coord: com.example:myapp:1.0\n    exportDeps: true\n");
        let graph = f.build(&scenario(&f)).unwrap();
        assert!(graph.find_by_key("com.example", "myapp").unwrap().config().is_some());
        assert!(graph.find_by_key("com.example", "mylib").unwrap().config().is_none());
    }

    #[test]
    fn test_sources_attached_when_served() {
        let f = Fixture::new("");
        let node = f.repo.with_sources(f.node("com.example:myapp:1.0")).unwrap();
        let graph = f.build(&DependencyNode::root().with_child(node)).unwrap();
        let sources = graph.find_by_key("com.example", "myapp").unwrap().sources().unwrap();
        assert_eq!(sources.coordinate.classifier, "sources");
        assert_eq!(
            sources.urls,
            vec!["https://repo.example/com/example/myapp/1.0/myapp-1.0-sources.jar"]
        );
    }

    #[test]
    fn test_sources_dropped_when_not_served() {
        let mut f = Fixture::new("");
        f.probe = FakeProbe::serving(["https://repo.example/com/example/myapp/1.0/myapp-1.0.jar"]);
        let node = f.repo.with_sources(f.node("com.example:myapp:1.0")).unwrap();
        let graph = f.build(&DependencyNode::root().with_child(node)).unwrap();
        let record = graph.find_by_key("com.example", "myapp").unwrap();
        assert!(record.sources().is_none());
        assert_eq!(record.urls().len(), 1);
    }

    #[test]
    fn test_missing_file_stops_collection() {
        let f = Fixture::new("");
        let tree = DependencyNode::root()
            .with_child(DependencyNode::artifact(Coordinate::new("com.example", "ghost", "1.0")));
        let err = f.build(&tree).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DepgenError>(),
            Some(DepgenError::ArtifactFileMissing { .. })
        ));
    }

    #[test]
    fn test_unserved_artifact_fails() {
        let mut f = Fixture::new("");
        f.probe = FakeProbe::failing();
        let err = f.build(&scenario(&f)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DepgenError>(),
            Some(DepgenError::NoRepositoryContainsArtifact { .. })
        ));
    }

    #[test]
    fn test_unmarked_conflict_reported() {
        let f = Fixture::new("");
        let tree = DependencyNode::root()
            .with_child(f.node("com.example:a:1.0"))
            .with_child(f.node("com.example:a:2.0"));
        let err = find_unmarked_conflicts(&tree, &f.config).unwrap_err();
        assert!(err.to_string().contains("com.example:a:jar:2.0"));

        let orphan = DependencyNode::root().with_child(
            f.node("com.example:a:1.0").duplicate_of(Coordinate::new("com.example", "a", "2.0")),
        );
        assert!(find_unmarked_conflicts(&orphan, &f.config).is_err());
    }

    fn all_keys(graph: &ApplicationRecord) -> Vec<String> {
        graph.records().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_unselected_winner_collected_through_duplicate() {
        let f = Fixture::new("");
        let shared: Coordinate = "com.example:shared:1.0".parse().unwrap();
        let tree = DependencyNode::root()
            .with_child(
                f.node("com.example:a:1.0")
                    .with_child(f.node("com.example:shared:1.0").with_optional(true)),
            )
            .with_child(f.node("com.example:b:1.0").with_child(
                f.node("com.example:c:1.0").with_child(
                    f.node("com.example:shared:1.0").duplicate_of(shared.clone()),
                ),
            ));

        let graph = f.select_and_build(&tree).unwrap();
        assert_eq!(
            all_keys(&graph),
            vec!["com.example:a", "com.example:b", "com.example:c", "com.example:shared"]
        );
        assert_eq!(graph.find_by_key("com.example", "shared").unwrap().coordinate(), &shared);
        assert!(graph.find_by_key("com.example", "a").unwrap().compile_deps().is_empty());
        let c = graph.find_by_key("com.example", "c").unwrap();
        assert_eq!(keys(c.compile_deps()), vec!["com.example:shared"]);
    }

    #[test]
    fn test_optional_reevaluated_per_path_in_records() {
        let f = Fixture::new("artifacts:\n  - coord: com.example:b\n    includeOptional: true\n");
        let shared: Coordinate = "com.example:shared:1.0".parse().unwrap();
        let tree = DependencyNode::root()
            .with_child(
                f.node("com.example:a:1.0")
                    .with_child(f.node("com.example:shared:1.0").with_optional(true)),
            )
            .with_child(f.node("com.example:b:1.0").with_child(
                f.node("com.example:shared:1.0").with_optional(true).duplicate_of(shared),
            ));

        let graph = f.select_and_build(&tree).unwrap();
        let shared = graph.find_by_key("com.example", "shared").unwrap();
        assert!(!shared.is_replacement());
        assert!(graph.find_by_key("com.example", "a").unwrap().compile_deps().is_empty());
        let b = graph.find_by_key("com.example", "b").unwrap();
        assert_eq!(keys(b.compile_deps()), vec!["com.example:shared"]);
    }

    #[test]
    fn test_rejected_subtrees_absent_from_records() {
        let f = Fixture::new(
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
            f.node("com.example:app:1.0")
                .with_child(
                    f.node("com.example:lib:1.0")
                        .with_child(f.node("com.example:opt:1.0").with_optional(true)),
                )
                .with_child(
                    f.node("com.example:replaced:1.0").with_child(f.node("com.example:hidden:1.0")),
                )
                .with_child(
                    f.node("com.example:unwanted:1.0")
                        .with_child(f.node("com.example:unwanted-dep:1.0")),
                )
                .with_child(f.node("com.example:banned:1.0"))
                .with_child(
                    f.node("com.example:tool:1.0")
                        .with_scope(Scope::Provided)
                        .with_child(f.node("com.example:tool-dep:1.0")),
                ),
        );

        let graph = f.select_and_build(&tree).unwrap();
        assert_eq!(
            all_keys(&graph),
            vec!["com.example:app", "com.example:lib", "com.example:replaced"]
        );
        assert!(graph.find_by_key("com.example", "replaced").unwrap().is_replacement());
    }

    #[test]
    fn test_tree_string() {
        let f = Fixture::new("artifacts:\n  - coord: com.example:myapp\n");
        let graph = f.build(&scenario(&f)).unwrap();
        assert_eq!(
            graph.to_tree_string(),
            "└── com.example:myapp:1.0 (declared)\n    ├── com.example:mylib:1.0\n    │   └── com.example:rtB:2.0 [runtime]\n    └── com.example:rtA:33.0 [runtime]\n"
        );
    }
}
