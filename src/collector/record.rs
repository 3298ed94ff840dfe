//! The materialized artifact graph.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::config::{ArtifactConfig, ReplacementConfig};
use crate::model::{ArtifactKey, Coordinate};

/// Companion sources jar of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcesArtifact {
    pub coordinate: Coordinate,
    pub sha256: String,
    pub urls: Vec<String>,
}

/// What a record stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Origin {
    /// Downloaded from a repository
    Resolved {
        sha256: String,
        urls: Vec<String>,
        sources: Option<SourcesArtifact>,
        config: Option<ArtifactConfig>,
        compile_deps: Vec<ArtifactKey>,
        runtime_deps: Vec<ArtifactKey>,
    },
    /// Supplied by an existing build target
    Replaced(ReplacementConfig),
}

/// One deduplicated artifact of the graph, keyed by `group:artifact`.
///
/// A record is either resolved (hash, URLs, dependencies) or a replacement
/// (a build target, nothing else). The two never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    key: ArtifactKey,
    coordinate: Coordinate,
    file: Option<std::path::PathBuf>,
    pom_file: Option<std::path::PathBuf>,
    origin: Origin,
}

impl ArtifactRecord {
    pub(crate) fn resolved(
        coordinate: Coordinate,
        file: &Path,
        pom_file: Option<&Path>,
        sha256: String,
        urls: Vec<String>,
        sources: Option<SourcesArtifact>,
        config: Option<ArtifactConfig>,
    ) -> Self {
        Self {
            key: coordinate.key(),
            coordinate,
            file: Some(file.to_path_buf()),
            pom_file: pom_file.map(Path::to_path_buf),
            origin: Origin::Resolved {
                sha256,
                urls,
                sources,
                config,
                compile_deps: Vec::new(),
                runtime_deps: Vec::new(),
            },
        }
    }

    pub(crate) fn replaced(coordinate: Coordinate, replacement: ReplacementConfig) -> Self {
        Self {
            key: coordinate.key(),
            coordinate,
            file: None,
            pom_file: None,
            origin: Origin::Replaced(replacement),
        }
    }

    /// Record `dependency` as a child of this record, once.
    ///
    /// # Panics
    ///
    /// If this is a replacement record: replacements are never traversed.
    pub(crate) fn link(&mut self, dependency: ArtifactKey, runtime: bool) {
        let Origin::Resolved {
            compile_deps,
            runtime_deps,
            ..
        } = &mut self.origin
        else {
            panic!("replacement record {} cannot have dependencies", self.key);
        };
        if compile_deps.contains(&dependency) || runtime_deps.contains(&dependency) {
            return;
        }
        if runtime {
            runtime_deps.push(dependency);
        } else {
            compile_deps.push(dependency);
        }
    }

    #[must_use]
    pub const fn key(&self) -> &ArtifactKey {
        &self.key
    }

    /// Coordinate of the version that won mediation.
    #[must_use]
    pub const fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }

    /// Resolved local file, `None` for replacements.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    #[must_use]
    pub fn pom_file(&self) -> Option<&Path> {
        self.pom_file.as_deref()
    }

    /// Hex sha256 of the artifact, `None` exactly for replacements.
    #[must_use]
    pub fn sha256(&self) -> Option<&str> {
        match &self.origin {
            Origin::Resolved {
                sha256,
                ..
            } => Some(sha256),
            Origin::Replaced(_) => None,
        }
    }

    /// URLs serving the artifact, in repository order.
    #[must_use]
    pub fn urls(&self) -> &[String] {
        match &self.origin {
            Origin::Resolved {
                urls,
                ..
            } => urls,
            Origin::Replaced(_) => &[],
        }
    }

    #[must_use]
    pub fn sources(&self) -> Option<&SourcesArtifact> {
        match &self.origin {
            Origin::Resolved {
                sources,
                ..
            } => sources.as_ref(),
            Origin::Replaced(_) => None,
        }
    }

    /// User configuration, present when the artifact is declared.
    #[must_use]
    pub fn config(&self) -> Option<&ArtifactConfig> {
        match &self.origin {
            Origin::Resolved {
                config,
                ..
            } => config.as_ref(),
            Origin::Replaced(_) => None,
        }
    }

    /// Replacement entry, present for replacement records.
    #[must_use]
    pub fn replacement(&self) -> Option<&ReplacementConfig> {
        match &self.origin {
            Origin::Replaced(replacement) => Some(replacement),
            Origin::Resolved {
                ..
            } => None,
        }
    }

    #[must_use]
    pub fn is_replacement(&self) -> bool {
        matches!(self.origin, Origin::Replaced(_))
    }

    /// Keys of compile-scope dependencies, in tree order.
    #[must_use]
    pub fn compile_deps(&self) -> &[ArtifactKey] {
        match &self.origin {
            Origin::Resolved {
                compile_deps,
                ..
            } => compile_deps,
            Origin::Replaced(_) => &[],
        }
    }

    /// Keys of runtime-scope dependencies, in tree order.
    #[must_use]
    pub fn runtime_deps(&self) -> &[ArtifactKey] {
        match &self.origin {
            Origin::Resolved {
                runtime_deps,
                ..
            } => runtime_deps,
            Origin::Replaced(_) => &[],
        }
    }

    fn label(&self) -> String {
        match &self.origin {
            Origin::Replaced(replacement) => {
                format!("{} -> {}", self.coordinate.gav(), replacement.target)
            }
            Origin::Resolved {
                config: Some(_),
                ..
            } => format!("{} (declared)", self.coordinate.gav()),
            Origin::Resolved {
                ..
            } => self.coordinate.gav(),
        }
    }
}

/// The whole artifact graph of one generation run.
///
/// Iteration is in key order, independent of the order the resolver reported
/// nodes in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationRecord {
    pub(crate) records: BTreeMap<ArtifactKey, ArtifactRecord>,
    pub(crate) roots: Vec<ArtifactKey>,
}

impl ApplicationRecord {
    /// Record for `group:artifact`, if the graph contains it.
    #[must_use]
    pub fn find_by_key(&self, group_id: &str, artifact_id: &str) -> Option<&ArtifactRecord> {
        self.records.get(&ArtifactKey::new(group_id, artifact_id))
    }

    #[must_use]
    pub fn get(&self, key: &ArtifactKey) -> Option<&ArtifactRecord> {
        self.records.get(key)
    }

    /// Record for a key the graph references.
    ///
    /// # Panics
    ///
    /// If the key is absent. Every linked key is materialized during
    /// collection, so this indicates a bug.
    #[must_use]
    pub fn record(&self, key: &ArtifactKey) -> &ArtifactRecord {
        self.records
            .get(key)
            .unwrap_or_else(|| panic!("artifact {key} is referenced but was never collected"))
    }

    /// All records in key order.
    pub fn records(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.records.values()
    }

    /// Keys of the root's direct dependencies, in tree order.
    #[must_use]
    pub fn roots(&self) -> &[ArtifactKey] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the graph from its roots.
    ///
    /// ```text
    /// └── com.example:myapp:1.0 (declared)
    ///     ├── com.example:mylib:1.0
    ///     │   └── com.example:rtB:2.0 [runtime]
    ///     └── com.example:rtA:33.0 [runtime]
    /// ```
    ///
    /// A record whose dependencies were already printed is marked `(*)`.
    #[must_use]
    pub fn to_tree_string(&self) -> String {
        let mut result = String::new();
        let mut printed = HashSet::new();
        for (i, key) in self.roots.iter().enumerate() {
            let is_last = i == self.roots.len() - 1;
            self.build_tree_string(key, "", is_last, false, &mut result, &mut printed);
        }
        result
    }

    fn build_tree_string(
        &self,
        key: &ArtifactKey,
        prefix: &str,
        is_last: bool,
        runtime: bool,
        result: &mut String,
        printed: &mut HashSet<ArtifactKey>,
    ) {
        let record = self.record(key);
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        let scope = if runtime {
            " [runtime]"
        } else {
            ""
        };

        let deps: Vec<(&ArtifactKey, bool)> = record
            .compile_deps()
            .iter()
            .map(|k| (k, false))
            .chain(record.runtime_deps().iter().map(|k| (k, true)))
            .collect();
        let repeated = !deps.is_empty() && !printed.insert(key.clone());
        let marker = if repeated {
            " (*)"
        } else {
            ""
        };
        result.push_str(&format!("{prefix}{connector}{}{scope}{marker}\n", record.label()));
        if repeated {
            return;
        }

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        for (i, (dep, runtime)) in deps.iter().enumerate() {
            let is_last_child = i == deps.len() - 1;
            self.build_tree_string(dep, &child_prefix, is_last_child, *runtime, result, printed);
        }
    }
}
