//! Test fixtures for creating sample data
//!
//! - [`LocalRepository`] lays out jars and POMs the way a Maven local
//!   repository does and returns tree nodes pointing at them. Its `file://`
//!   URL doubles as a remote repository for [`HttpProbe`](crate::cache::HttpProbe).
//! - [`FakeProbe`] answers existence probes from a fixed set and counts calls.
//! - [`ConfigFixture`] holds sample `dependencies.yml` files.

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::cache::RepositoryProbe;
use crate::config::Credentials;
use crate::constants::PROCESSOR_SERVICE_ENTRY;
use crate::model::{Coordinate, DependencyNode};

/// Write a zip archive at `path` containing `(name, content)` entries.
pub fn write_jar(path: &Path, entries: &[(&str, &str)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options)?;
        writer.write_all(content.as_bytes())?;
    }
    writer.finish()?;
    Ok(())
}

/// Write a minimal POM at `path` declaring `licenses` by name.
pub fn write_pom(path: &Path, coordinate: &Coordinate, licenses: &[&str]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut pom = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n  <modelVersion>4.0.0</modelVersion>\n  <groupId>{}</groupId>\n  <artifactId>{}</artifactId>\n  <version>{}</version>\n",
        coordinate.group_id, coordinate.artifact_id, coordinate.version
    );
    if !licenses.is_empty() {
        pom.push_str("  <licenses>\n");
        for license in licenses {
            pom.push_str(&format!("    <license>\n      <name>{license}</name>\n    </license>\n"));
        }
        pom.push_str("  </licenses>\n");
    }
    pom.push_str("</project>\n");
    fs::write(path, pom).with_context(|| format!("Failed to write {}", path.display()))
}

/// A Maven-layout directory of artifacts.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `file://` URL of the repository, ending with `/`.
    pub fn url(&self) -> String {
        format!("file://{}/", self.root.display())
    }

    /// Location of `coordinate` inside the repository.
    pub fn path_of(&self, coordinate: &Coordinate) -> PathBuf {
        self.root.join(coordinate.repository_path())
    }

    /// Write a jar and an Apache-licensed POM for `coordinate` and return a
    /// resolved node pointing at them.
    pub fn artifact(&self, coordinate: &str) -> Result<DependencyNode> {
        let class = format!("{}.class", coordinate.replace([':', '.', '-'], "/"));
        self.install(coordinate, &[(class.as_str(), "")], &["The Apache Software License, Version 2.0"])
    }

    /// Like [`artifact`](Self::artifact), registering `processors` in the jar.
    pub fn processor_artifact(&self, coordinate: &str, processors: &[&str]) -> Result<DependencyNode> {
        let registration = processors.join("\n");
        self.install(coordinate, &[(PROCESSOR_SERVICE_ENTRY, registration.as_str())], &["MIT License"])
    }

    /// Write jar entries and a POM with `licenses` for `coordinate`.
    pub fn install(
        &self,
        coordinate: &str,
        entries: &[(&str, &str)],
        licenses: &[&str],
    ) -> Result<DependencyNode> {
        let coordinate: Coordinate = coordinate.parse()?;
        let jar = self.path_of(&coordinate);
        write_jar(&jar, entries)?;
        let pom = self.path_of(&coordinate.clone().with_extension("pom"));
        write_pom(&pom, &coordinate, licenses)?;
        Ok(DependencyNode::artifact(coordinate).with_file(jar).with_pom_file(pom))
    }

    /// Write the sources jar of `node`'s artifact and attach it.
    pub fn with_sources(&self, node: DependencyNode) -> Result<DependencyNode> {
        let coordinate =
            node.coordinate.as_ref().context("Synthetic root has no sources")?.sources();
        let path = self.path_of(&coordinate);
        write_jar(&path, &[("Source.java", "class Source {}")])?;
        Ok(node.with_sources_file(path))
    }
}

/// Repository probe answering from a fixed set of URLs.
///
/// Clones share the call log, so a test can keep a handle after boxing one
/// into a [`MetadataCache`](crate::cache::MetadataCache).
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    available: HashSet<String>,
    everything: bool,
    fail: bool,
    calls: Rc<RefCell<Vec<String>>>,
}

impl FakeProbe {
    /// Serves exactly `urls`.
    pub fn serving<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Serves every URL.
    pub fn serving_everything() -> Self {
        Self {
            everything: true,
            ..Self::default()
        }
    }

    /// Every probe fails with an error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// URLs probed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl RepositoryProbe for FakeProbe {
    fn exists(&self, url: &str, _credentials: Option<&Credentials>) -> Result<bool> {
        self.calls.borrow_mut().push(url.to_string());
        if self.fail {
            anyhow::bail!("connection refused: {url}");
        }
        Ok(self.everything || self.available.contains(url))
    }
}

/// Sample configuration files.
#[derive(Clone, Debug)]
pub struct ConfigFixture {
    pub content: String,
}

impl ConfigFixture {
    /// Configuration with one repository at `repository_url`.
    pub fn basic(repository_url: &str) -> Self {
        Self {
            content: format!(
                "repositories:\n  - name: local\n    url: {repository_url}\noptions:\n  workspaceDirectory: workspace\n"
            ),
        }
    }

    /// Append raw YAML, e.g. an `artifacts:` section.
    #[must_use]
    pub fn with_yaml(mut self, yaml: &str) -> Self {
        self.content.push_str(yaml);
        self
    }

    /// Write the configuration as `dependencies.yml` in `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(crate::constants::DEFAULT_CONFIG_FILE);
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}
