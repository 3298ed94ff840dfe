//! Generator configuration (`dependencies.yml`).
//!
//! The configuration names the repositories artifacts are fetched from, global
//! output options, per-artifact overrides, global exclusions, and replacements
//! of artifacts by existing build targets.
//!
//! ```yaml
//! repositories:
//!   - name: central
//!     url: https://repo.maven.apache.org/maven2/
//! options:
//!   extensionFile: thirdparty/dependencies.bzl
//!   aliasStrategy: ArtifactId
//! artifacts:
//!   - coord: com.google.dagger:dagger-compiler:2.25
//!     natures: [Plugin]
//!   - coord: com.example:myapp:1.0
//!     includeOptional: true
//! excludes:
//!   - coord: commons-logging:commons-logging
//! replacements:
//!   - coord: com.example:mylib
//!     target: "//third_party/mylib"
//! ```
//!
//! Parsing is plain serde; [`ApplicationConfig::load`] runs [`validation`]
//! before returning so that malformed coordinates and conflicting overrides are
//! reported before any dependency is traversed.

pub mod validation;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::cache::licenses::LicenseClassification;
use crate::constants::{
    DEFAULT_EXTENSION_FILE, DEFAULT_REPOSITORY_NAME, DEFAULT_REPOSITORY_URL,
};
use crate::core::DepgenError;
use crate::model::ArtifactKey;

/// Which rule families a record produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Nature {
    /// `java_import` of the artifact
    Java,
    /// `java_plugin` per annotation processor
    Plugin,
    /// `j2cl_library` over the artifact
    J2cl,
}

impl Nature {
    /// Suffix appended to target names when the nature needs disambiguation.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Plugin => "plugin",
            Self::J2cl => "j2cl",
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Java => "Java",
            Self::Plugin => "Plugin",
            Self::J2cl => "J2cl",
        };
        f.write_str(name)
    }
}

/// How the version-independent alias of an artifact is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AliasStrategy {
    /// `group` and `artifact` folded, e.g. `com_example__my_app`
    #[default]
    GroupIdAndArtifactId,
    /// `artifact` alone, e.g. `my_app`
    ArtifactId,
}

/// A remote Maven repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Identifier, also the key for cached URLs and credentials
    pub name: String,
    /// Base URL; normalized to end with `/` during validation
    pub url: String,
}

impl RepositoryConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

fn default_repositories() -> Vec<RepositoryConfig> {
    vec![RepositoryConfig::new(DEFAULT_REPOSITORY_NAME, DEFAULT_REPOSITORY_URL)]
}

/// Credentials for one repository.
///
/// Loading these from a settings file is the caller's concern; the generator only
/// passes them to the repository probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Credentials keyed by repository name.
pub type AuthContexts = BTreeMap<String, Credentials>;

const fn default_true() -> bool {
    true
}

fn default_natures() -> Vec<Nature> {
    vec![Nature::Java]
}

fn default_extension_file() -> PathBuf {
    PathBuf::from(DEFAULT_EXTENSION_FILE)
}

/// Global generation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionsConfig {
    /// Bazel workspace root, relative to the configuration file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_directory: Option<PathBuf>,
    /// Generated extension file, relative to the workspace root
    #[serde(default = "default_extension_file")]
    pub extension_file: PathBuf,
    /// Prefix for every generated target and repository name
    #[serde(default)]
    pub name_prefix: String,
    /// Default alias strategy
    #[serde(default)]
    pub alias_strategy: AliasStrategy,
    /// Natures of artifacts without an explicit `natures` list
    #[serde(default = "default_natures")]
    pub default_natures: Vec<Nature>,
    /// Whether import rules re-export their compile dependencies
    #[serde(default)]
    pub export_deps: bool,
    /// Whether companion sources artifacts are emitted
    #[serde(default = "default_true")]
    pub include_source: bool,
    /// Whether a missing POM reported by the resolver fails the run
    #[serde(default = "default_true")]
    pub fail_on_missing_pom: bool,
    /// Whether an unparseable POM reported by the resolver fails the run
    #[serde(default = "default_true")]
    pub fail_on_invalid_pom: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            workspace_directory: None,
            extension_file: default_extension_file(),
            name_prefix: String::new(),
            alias_strategy: AliasStrategy::default(),
            default_natures: default_natures(),
            export_deps: false,
            include_source: true,
            fail_on_missing_pom: true,
            fail_on_invalid_pom: true,
        }
    }
}

/// Coordinate as written in the configuration: `group:artifact[:type[:classifier]][:version]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCoordinate {
    /// Identity the entry applies to
    pub key: ArtifactKey,
    /// Packaging type, if given
    pub extension: Option<String>,
    /// Classifier, if given
    pub classifier: Option<String>,
    /// Version, if given
    pub version: Option<String>,
}

impl fmt::Display for ConfigCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if let Some(extension) = &self.extension {
            write!(f, ":{extension}")?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        Ok(())
    }
}

impl FromStr for ConfigCoordinate {
    type Err = DepgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(DepgenError::InvalidCoordinate {
                coordinate: s.to_string(),
                reason: "empty segment".to_string(),
            });
        }
        let owned = |p: &str| Some(p.to_string());
        let (extension, classifier, version) = match parts.as_slice() {
            [_, _] => (None, None, None),
            [_, _, v] => (None, None, owned(v)),
            [_, _, e, v] => (owned(e), None, owned(v)),
            [_, _, e, c, v] => (owned(e), owned(c), owned(v)),
            _ => {
                return Err(DepgenError::InvalidCoordinate {
                    coordinate: s.to_string(),
                    reason: "expected group:artifact[:type[:classifier]][:version]".to_string(),
                });
            }
        };
        Ok(Self {
            key: ArtifactKey::new(parts[0], parts[1]),
            extension,
            classifier,
            version,
        })
    }
}

impl Serialize for ConfigCoordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConfigCoordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// J2cl-specific options of an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct J2clConfig {
    /// Closure diagnostics to suppress on the generated library
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppress: Vec<String>,
}

/// Per-artifact overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArtifactConfig {
    /// Artifact the entry applies to
    pub coord: ConfigCoordinate,
    /// Include the optional dependencies this artifact declares
    #[serde(default)]
    pub include_optional: bool,
    /// Natures, defaulting to `options.defaultNatures`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub natures: Vec<Nature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_strategy: Option<AliasStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_deps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_source: Option<bool>,
    /// Dependencies of this artifact that are never traversed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<ArtifactKey>,
    /// Visibility of the alias targets, default public
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visibility: Vec<String>,
    /// License classification overriding what the POM declares
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<LicenseClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub j2cl: Option<J2clConfig>,
}

/// A globally excluded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeConfig {
    pub coord: ArtifactKey,
}

/// An artifact supplied by an existing build target instead of a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplacementConfig {
    pub coord: ArtifactKey,
    /// Bazel label that stands in for the artifact
    pub target: String,
}

/// The complete generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationConfig {
    #[serde(default = "default_repositories")]
    pub repositories: Vec<RepositoryConfig>,
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub artifacts: Vec<ArtifactConfig>,
    #[serde(default)]
    pub excludes: Vec<ExcludeConfig>,
    #[serde(default)]
    pub replacements: Vec<ReplacementConfig>,
    /// File the configuration was loaded from
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            repositories: default_repositories(),
            options: OptionsConfig::default(),
            artifacts: Vec::new(),
            excludes: Vec::new(),
            replacements: Vec::new(),
            config_file: None,
        }
    }
}

impl ApplicationConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DepgenError::ConfigNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let mut config = Self::from_yaml(&content).map_err(|e| DepgenError::ConfigParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.config_file = Some(path.to_path_buf());
        config.validate()?;
        debug!(
            "Loaded configuration {} ({} artifacts, {} replacements, {} excludes)",
            path.display(),
            config.artifacts.len(),
            config.replacements.len(),
            config.excludes.len()
        );
        Ok(config)
    }

    /// Parse YAML without validating.
    ///
    /// An empty document yields the default configuration.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Validate and normalize in place. See [`validation`].
    pub fn validate(&mut self) -> Result<()> {
        validation::validate(self)
    }

    /// User overrides for `key`, if the artifact is declared.
    #[must_use]
    pub fn artifact(&self, key: &ArtifactKey) -> Option<&ArtifactConfig> {
        self.artifacts.iter().find(|a| a.coord.key == *key)
    }

    /// Replacement target for `key`, if any.
    #[must_use]
    pub fn replacement(&self, key: &ArtifactKey) -> Option<&ReplacementConfig> {
        self.replacements.iter().find(|r| r.coord == *key)
    }

    /// Whether `key` is excluded everywhere in the graph.
    #[must_use]
    pub fn is_excluded(&self, key: &ArtifactKey) -> bool {
        self.excludes.iter().any(|e| e.coord == *key)
    }

    /// Whether the user asked for the optional dependencies of `key`.
    #[must_use]
    pub fn includes_optional(&self, key: &ArtifactKey) -> bool {
        self.artifact(key).is_some_and(|a| a.include_optional)
    }

    /// Natures of `key`, falling back to the global default.
    #[must_use]
    pub fn natures(&self, key: &ArtifactKey) -> Vec<Nature> {
        match self.artifact(key) {
            Some(a) if !a.natures.is_empty() => a.natures.clone(),
            _ => self.options.default_natures.clone(),
        }
    }

    #[must_use]
    pub fn alias_strategy(&self, key: &ArtifactKey) -> AliasStrategy {
        self.artifact(key)
            .and_then(|a| a.alias_strategy)
            .unwrap_or(self.options.alias_strategy)
    }

    #[must_use]
    pub fn export_deps(&self, key: &ArtifactKey) -> bool {
        self.artifact(key).and_then(|a| a.export_deps).unwrap_or(self.options.export_deps)
    }

    #[must_use]
    pub fn include_source(&self, key: &ArtifactKey) -> bool {
        self.artifact(key).and_then(|a| a.include_source).unwrap_or(self.options.include_source)
    }

    /// Directory holding the configuration file, or `.` when built in memory.
    #[must_use]
    pub fn config_directory(&self) -> PathBuf {
        self.config_file
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }

    /// Bazel workspace root.
    #[must_use]
    pub fn workspace_directory(&self) -> PathBuf {
        let base = self.config_directory();
        match &self.options.workspace_directory {
            Some(dir) => base.join(dir),
            None => base,
        }
    }

    /// Absolute location of the generated extension file.
    #[must_use]
    pub fn extension_file(&self) -> PathBuf {
        self.workspace_directory().join(&self.options.extension_file)
    }

    /// Name of the configuration file as shown in generated headers.
    #[must_use]
    pub fn config_file_name(&self) -> String {
        self.config_file
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(
                || crate::constants::DEFAULT_CONFIG_FILE.to_string(),
                |n| n.to_string_lossy().into_owned(),
            )
    }

    /// Hex sha256 of the canonical serialization of this configuration.
    ///
    /// Independent of formatting and comments in the source YAML; changes
    /// whenever a setting that affects output changes.
    pub fn config_sha256(&self) -> Result<String> {
        let canonical =
            serde_json::to_vec(self).context("Failed to serialize configuration for hashing")?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }
}
