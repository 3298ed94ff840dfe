//! Build file generation.
//!
//! The [`Generator`] renders an [`ApplicationRecord`] into two files:
//!
//! - the **extension file** (`thirdparty/dependencies.bzl` by default), fully
//!   owned by the generator and rewritten on every run. It defines
//!   `generate_workspace_rules()`, one `http_file` per artifact and sources
//!   jar, and `generate_targets()`, the import, plugin, library and alias rules
//!   of every record ordered by `group:artifact`.
//! - the **wrapper** `BUILD.bazel` next to it, which calls
//!   `generate_targets()`. It is only written when absent so that users may
//!   edit it freely.
//!
//! Rendering and writing are separate steps: [`Generator::generate`] returns
//! the file contents as [`GeneratedFiles`], and [`GeneratedFiles::write`]
//! puts them on disk.
//!
//! Output is a pure function of the graph, the configuration and the cached
//! artifact facts. Running twice on the same input produces byte-identical
//! files.

pub mod naming;
pub mod rules;
pub mod starlark;
pub mod templates;

pub use naming::{TargetNames, fold};
pub use rules::RuleEmitter;
pub use starlark::Rule;

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tera::Context;
use tracing::info;

use crate::cache::MetadataCache;
use crate::collector::ApplicationRecord;
use crate::config::ApplicationConfig;
use crate::constants::{GENERATOR_VERSION, WRAPPER_FILE};
use crate::core::DepgenError;
use crate::utils::{atomic_write, ensure_dir, write_if_absent};
use templates::{EXTENSION_TEMPLATE, Templates, WRAPPER_TEMPLATE};

const HTTP_FILE_LOAD: &str =
    r#"load("@bazel_tools//tools/build_defs/repo:http.bzl", "http_file")"#;
const J2CL_LOAD: &str = r#"load("@com_google_j2cl//build_defs:rules.bzl", "j2cl_library")"#;

/// How a generated file treats an existing file at its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace whatever is there
    Overwrite,
    /// Leave an existing file untouched
    CreateOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub content: String,
    pub mode: WriteMode,
}

/// Files produced by one generation run, keyed by absolute path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFiles {
    files: BTreeMap<PathBuf, GeneratedFile>,
}

/// Outcome of [`GeneratedFiles::write`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Files written by this run
    pub written: Vec<PathBuf>,
    /// Create-only files that already existed
    pub untouched: Vec<PathBuf>,
}

impl GeneratedFiles {
    pub fn insert(&mut self, path: PathBuf, content: String, mode: WriteMode) {
        self.files.insert(
            path,
            GeneratedFile {
                content,
                mode,
            },
        );
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&GeneratedFile> {
        self.files.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &GeneratedFile)> {
        self.files.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file, creating parent directories as needed.
    pub fn write(&self) -> Result<WriteReport> {
        let mut report = WriteReport::default();
        for (path, file) in &self.files {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                ensure_dir(parent).map_err(|e| DepgenError::DirectoryCreationFailed {
                    path: parent.display().to_string(),
                    reason: format!("{e:#}"),
                })?;
            }
            let generation_failed = |e: anyhow::Error| DepgenError::GenerationFailed {
                path: path.display().to_string(),
                reason: format!("{e:#}"),
            };
            match file.mode {
                WriteMode::Overwrite => {
                    atomic_write(path, file.content.as_bytes()).map_err(generation_failed)?;
                    info!("Wrote {}", path.display());
                    report.written.push(path.clone());
                }
                WriteMode::CreateOnly => {
                    if write_if_absent(path, &file.content).map_err(generation_failed)? {
                        info!("Created {}", path.display());
                        report.written.push(path.clone());
                    } else {
                        info!("Kept existing {}", path.display());
                        report.untouched.push(path.clone());
                    }
                }
            }
        }
        Ok(report)
    }
}

/// Renders the build files of a graph.
#[derive(Debug)]
pub struct Generator<'a> {
    config: &'a ApplicationConfig,
    graph: &'a ApplicationRecord,
    templates: Templates,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a ApplicationConfig, graph: &'a ApplicationRecord) -> Result<Self> {
        Ok(Self {
            config,
            graph,
            templates: Templates::new()?,
        })
    }

    /// Render the extension file and the wrapper.
    pub fn generate(&self, cache: &mut MetadataCache) -> Result<GeneratedFiles> {
        let extension_file = self.config.extension_file();
        let wrapper_file = extension_file
            .parent()
            .map_or_else(|| PathBuf::from(WRAPPER_FILE), |dir| dir.join(WRAPPER_FILE));

        let mut files = GeneratedFiles::default();
        files.insert(extension_file, self.render_extension(cache)?, WriteMode::Overwrite);
        files.insert(wrapper_file, self.render_wrapper()?, WriteMode::CreateOnly);
        Ok(files)
    }

    /// Contents of the extension file.
    pub fn render_extension(&self, cache: &mut MetadataCache) -> Result<String> {
        let emitter = RuleEmitter::new(self.config, self.graph);
        emitter.check_target_names()?;

        let mut workspace_rules = Vec::new();
        let mut target_rules = Vec::new();
        for record in self.graph.records() {
            workspace_rules.extend(emitter.workspace_rules(record));
            target_rules.extend(emitter.target_rules(record, cache)?);
        }
        info!(
            "Rendering {} repository rules and {} target rules for {} artifacts",
            workspace_rules.len(),
            target_rules.len(),
            self.graph.len()
        );

        let mut loads = vec![HTTP_FILE_LOAD];
        if emitter.needs_j2cl() {
            loads.push(J2CL_LOAD);
        }

        let mut context = self.header_context();
        context.insert("config_sha256", &self.config.config_sha256()?);
        context.insert("loads", &loads);
        context.insert("workspace_rules", &starlark::render_body(&workspace_rules));
        context.insert("targets", &starlark::render_body(&target_rules));
        self.templates.render(EXTENSION_TEMPLATE, &context)
    }

    /// Contents of the wrapper `BUILD.bazel`.
    pub fn render_wrapper(&self) -> Result<String> {
        let mut context = self.header_context();
        context.insert("extension_label", &extension_label(&self.config.options.extension_file));
        self.templates.render(WRAPPER_TEMPLATE, &context)
    }

    fn header_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config_file", &self.config.config_file_name());
        context.insert("version", GENERATOR_VERSION);
        context
    }
}

/// Bazel label of a file given relative to the workspace root.
fn extension_label(relative: &Path) -> String {
    let name = relative.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let package: Vec<String> = relative
        .parent()
        .map(|dir| dir.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect())
        .unwrap_or_default();
    format!("//{}:{name}", package.join("/"))
}
