//! Translation of artifact records into Starlark rules.

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::naming::TargetNames;
use super::starlark::Rule;
use crate::cache::{LicenseClassification, MetadataCache};
use crate::collector::{ApplicationRecord, ArtifactRecord};
use crate::config::{ApplicationConfig, Nature};
use crate::core::DepgenError;
use crate::model::{ArtifactKey, Coordinate};

const PUBLIC_VISIBILITY: &str = "//visibility:public";
const PRIVATE_VISIBILITY: &str = "//visibility:private";

/// Emits the rules of every record in a graph.
#[derive(Debug, Clone, Copy)]
pub struct RuleEmitter<'a> {
    config: &'a ApplicationConfig,
    graph: &'a ApplicationRecord,
}

impl<'a> RuleEmitter<'a> {
    pub const fn new(config: &'a ApplicationConfig, graph: &'a ApplicationRecord) -> Self {
        Self {
            config,
            graph,
        }
    }

    fn names(&self, record: &ArtifactRecord) -> TargetNames {
        TargetNames::new(record.coordinate(), self.config)
    }

    /// Fail when two records would emit a target of the same name.
    pub fn check_target_names(&self) -> Result<()> {
        let mut owners: BTreeMap<String, &Coordinate> = BTreeMap::new();
        for record in self.graph.records().filter(|record| !record.is_replacement()) {
            let names = self.names(record);
            let produced: BTreeSet<String> = names
                .natures()
                .iter()
                .flat_map(|&nature| [names.target(nature), names.alias(nature)])
                .collect();
            for name in produced {
                if let Some(previous) = owners.insert(name.clone(), record.coordinate()) {
                    return Err(DepgenError::InvalidConfig {
                        reason: format!(
                            "{previous} and {} both produce the target '{name}'",
                            record.coordinate()
                        ),
                        fragment: format!(
                            "- coord: {}\n- coord: {}",
                            previous.key(),
                            record.key()
                        ),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// `http_file` rules for the artifact and its sources jar.
    ///
    /// Replacement records download nothing.
    #[must_use]
    pub fn workspace_rules(&self, record: &ArtifactRecord) -> Vec<Rule> {
        let Some(sha256) = record.sha256() else {
            return Vec::new();
        };
        let names = self.names(record);
        let mut rules = vec![
            Rule::new("http_file", &names.primary)
                .str("downloaded_file_path", record.coordinate().file_name())
                .str("sha256", sha256)
                .list("urls", record.urls().iter().cloned()),
        ];
        if let Some(sources) = record.sources() {
            rules.push(
                Rule::new("http_file", names.sources_repository())
                    .str("downloaded_file_path", sources.coordinate.file_name())
                    .str("sha256", &sources.sha256)
                    .list("urls", sources.urls.iter().cloned()),
            );
        }
        rules
    }

    /// Target rules for every nature of `record`, each followed by its alias.
    pub fn target_rules(
        &self,
        record: &ArtifactRecord,
        cache: &mut MetadataCache,
    ) -> Result<Vec<Rule>> {
        if record.is_replacement() {
            return Ok(Vec::new());
        }
        let names = self.names(record);
        let licenses = self.licenses(record, cache);
        let mut rules = Vec::new();
        for &nature in names.natures() {
            match nature {
                Nature::Java => {
                    rules.push(self.java_import(record, &names, &names.target(nature), &licenses));
                }
                Nature::Plugin => {
                    rules.extend(self.plugin_rules(record, &names, &licenses, cache)?);
                }
                Nature::J2cl => rules.push(self.j2cl_library(record, &names)),
            }
            rules.push(self.alias(record, &names, nature));
        }
        Ok(rules)
    }

    fn java_import(
        &self,
        record: &ArtifactRecord,
        names: &TargetNames,
        name: &str,
        licenses: &[String],
    ) -> Rule {
        let deps = self.labels(record.compile_deps(), Nature::Java);
        let exports = if self.config.export_deps(record.key()) {
            deps.clone()
        } else {
            Vec::new()
        };
        let mut rule = Rule::new("java_import", name).list("jars", [format!("@{}//file", names.primary)]);
        if record.sources().is_some() {
            rule = rule.str("srcjar", format!("@{}//file", names.sources_repository()));
        }
        rule.list("licenses", licenses.iter().cloned())
            .list("tags", [format!("maven_coordinates={}", record.coordinate().gav())])
            .list("visibility", [PRIVATE_VISIBILITY])
            .list("deps", deps)
            .list("exports", exports)
            .list("runtime_deps", self.labels(record.runtime_deps(), Nature::Java))
    }

    fn plugin_rules(
        &self,
        record: &ArtifactRecord,
        names: &TargetNames,
        licenses: &[String],
        cache: &mut MetadataCache,
    ) -> Result<Vec<Rule>> {
        let library = names.plugin_library();
        let mut rules = vec![self.java_import(record, names, &library, licenses)];

        let registered = match record.file() {
            Some(jar) => cache.processors(jar)?.unwrap_or_default(),
            None => Vec::new(),
        };
        let mut plugin_names: BTreeMap<String, &str> = BTreeMap::new();
        let mut processors = Vec::new();
        for processor in registered.iter().map(String::as_str) {
            match plugin_names.insert(names.plugin(Some(processor)), processor) {
                Some(previous) if previous == processor => {}
                Some(previous) => {
                    return Err(DepgenError::InvalidConfig {
                        reason: format!(
                            "processors {previous} and {processor} of {} both produce the target '{}'",
                            record.coordinate(),
                            names.plugin(Some(processor))
                        ),
                        fragment: format!("coord: {}", record.key()),
                    }
                    .into());
                }
                None => processors.push(processor),
            }
        }
        if processors.is_empty() {
            debug!("No annotation processors registered in {}", record.coordinate());
        }

        let library_label = format!(":{library}");
        let plugins: Vec<Rule> = if processors.is_empty() {
            vec![
                Rule::new("java_plugin", names.plugin(None))
                    .list("visibility", [PRIVATE_VISIBILITY])
                    .list("deps", [library_label]),
            ]
        } else {
            processors
                .iter()
                .map(|&processor| {
                    Rule::new("java_plugin", names.plugin(Some(processor)))
                        .str("processor_class", processor)
                        .list("visibility", [PRIVATE_VISIBILITY])
                        .list("deps", [library_label.clone()])
                })
                .collect()
        };

        let exported: Vec<String> = plugins
            .iter()
            .filter_map(|plugin| plugin.name().map(|name| format!(":{name}")))
            .collect();
        rules.extend(plugins);
        rules.push(
            Rule::new("java_library", names.target(Nature::Plugin))
                .list("exported_plugins", exported)
                .list("visibility", [PRIVATE_VISIBILITY]),
        );
        Ok(rules)
    }

    fn j2cl_library(&self, record: &ArtifactRecord, names: &TargetNames) -> Rule {
        let suppress = record
            .config()
            .and_then(|c| c.j2cl.as_ref())
            .map(|j2cl| j2cl.suppress.clone())
            .unwrap_or_default();
        Rule::new("j2cl_library", names.target(Nature::J2cl))
            .list("srcs", [format!("@{}//file", names.primary)])
            .list("js_suppress", suppress)
            .list("visibility", [PRIVATE_VISIBILITY])
            .list("deps", self.labels(record.compile_deps(), Nature::J2cl))
    }

    fn alias(&self, record: &ArtifactRecord, names: &TargetNames, nature: Nature) -> Rule {
        let visibility = record
            .config()
            .map(|c| c.visibility.clone())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec![PUBLIC_VISIBILITY.to_string()]);
        Rule::new("alias", names.alias(nature))
            .str("actual", format!(":{}", names.target(nature)))
            .list("visibility", visibility)
    }

    /// Labels of `keys` as seen from a rule of `nature`.
    ///
    /// Replaced dependencies resolve to their replacement target. Java rules
    /// depend on the Java target of a child, or its plugin target when that
    /// is all it has; J2cl rules depend only on J2cl targets.
    fn labels(&self, keys: &[ArtifactKey], nature: Nature) -> Vec<String> {
        keys.iter()
            .filter_map(|key| {
                let dependency = self.graph.record(key);
                if let Some(replacement) = dependency.replacement() {
                    return Some(replacement.target.clone());
                }
                let names = self.names(dependency);
                let candidates: &[Nature] = match nature {
                    Nature::J2cl => &[Nature::J2cl],
                    Nature::Java | Nature::Plugin => &[Nature::Java, Nature::Plugin],
                };
                let label = candidates
                    .iter()
                    .find(|n| names.has_nature(**n))
                    .map(|n| format!(":{}", names.alias(*n)));
                if label.is_none() {
                    debug!("{key} has no {nature} target, dropped from dependencies");
                }
                label
            })
            .collect()
    }

    /// Bazel license classifications of `record`, configured or read from its POM.
    fn licenses(&self, record: &ArtifactRecord, cache: &mut MetadataCache) -> Vec<String> {
        let configured = record.config().map(|c| c.licenses.as_slice()).unwrap_or_default();
        let classifications: BTreeSet<LicenseClassification> = if configured.is_empty() {
            match (record.file(), record.pom_file()) {
                (Some(file), Some(pom)) => match cache.licenses(file, pom) {
                    Ok(licenses) => licenses
                        .unwrap_or_default()
                        .into_iter()
                        .map(|license| license.classification)
                        .collect(),
                    Err(e) => {
                        warn!("Unable to read licenses of {}: {e:#}", record.coordinate());
                        BTreeSet::new()
                    }
                },
                _ => BTreeSet::new(),
            }
        } else {
            configured.iter().copied().collect()
        };
        classifications
            .into_iter()
            .filter(|c| *c != LicenseClassification::Unknown)
            .map(|c| c.as_str().to_string())
            .collect()
    }

    /// Whether any record emits a J2cl rule.
    #[must_use]
    pub fn needs_j2cl(&self) -> bool {
        self.graph
            .records()
            .filter(|record| !record.is_replacement())
            .any(|record| self.config.natures(record.key()).contains(&Nature::J2cl))
    }
}
