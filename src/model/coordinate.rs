//! Artifact coordinates, identity keys, and dependency scopes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::iter;
use std::str::FromStr;

use crate::core::DepgenError;

/// Default packaging type when a coordinate omits it.
pub const DEFAULT_EXTENSION: &str = "jar";

/// Classifier of the companion sources artifact.
pub const SOURCES_CLASSIFIER: &str = "sources";

/// A fully resolved Maven artifact coordinate.
///
/// Parsed from and displayed as `group:artifact[:extension[:classifier]]:version`,
/// the format the resolution engine reports coordinates in.
///
/// # Examples
///
/// ```rust
/// use bazel_depgen::model::Coordinate;
///
/// let coord: Coordinate = "com.example:myapp:1.0".parse().unwrap();
/// assert_eq!(coord.extension, "jar");
/// assert_eq!(coord.repository_path(), "com/example/myapp/1.0/myapp-1.0.jar");
/// assert_eq!(coord.key().to_string(), "com.example:myapp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Maven `groupId`
    pub group_id: String,
    /// Maven `artifactId`
    pub artifact_id: String,
    /// Packaging type, `jar` unless stated otherwise
    pub extension: String,
    /// Classifier, empty for the main artifact
    pub classifier: String,
    /// Resolved version
    pub version: String,
}

impl Coordinate {
    /// Create a `jar` coordinate without a classifier.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            classifier: String::new(),
            version: version.into(),
        }
    }

    /// Replace the packaging type.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// The `group:artifact` identity used for deduplication.
    #[must_use]
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::new(self.group_id.clone(), self.artifact_id.clone())
    }

    /// Coordinate of the companion sources jar.
    #[must_use]
    pub fn sources(&self) -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            classifier: SOURCES_CLASSIFIER.to_string(),
            ..self.clone()
        }
    }

    /// `group:artifact:version`, the form used in `maven_coordinates` tags.
    #[must_use]
    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// Path of the artifact relative to a Maven repository root.
    #[must_use]
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.file_name()
        )
    }

    /// File name of the artifact inside its repository directory.
    #[must_use]
    pub fn file_name(&self) -> String {
        if self.classifier.is_empty() {
            format!("{}-{}.{}", self.artifact_id, self.version, self.extension)
        } else {
            format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, self.classifier, self.extension
            )
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for Coordinate {
    type Err = DepgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_segments(s)?;
        let (group, artifact, extension, classifier, version) = match parts.as_slice() {
            [g, a, v] => (*g, *a, DEFAULT_EXTENSION, "", *v),
            [g, a, e, v] => (*g, *a, *e, "", *v),
            [g, a, e, c, v] => (*g, *a, *e, *c, *v),
            _ => {
                return Err(invalid(
                    s,
                    "expected group:artifact[:extension[:classifier]]:version",
                ));
            }
        };
        Ok(Self {
            group_id: group.to_string(),
            artifact_id: artifact.to_string(),
            extension: extension.to_string(),
            classifier: classifier.to_string(),
            version: version.to_string(),
        })
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Version-independent artifact identity, `group:artifact`.
///
/// Ordering is the lexicographic order of the `group:artifact` string so that
/// anything iterated by key comes out the same way a sorted list of key strings
/// would.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    /// Maven `groupId`
    pub group_id: String,
    /// Maven `artifactId`
    pub artifact_id: String,
}

impl ArtifactKey {
    /// Create a key from its two parts.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    fn text(&self) -> impl Iterator<Item = u8> + '_ {
        self.group_id.bytes().chain(iter::once(b':')).chain(self.artifact_id.bytes())
    }
}

impl Ord for ArtifactKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text().cmp(other.text())
    }
}

impl PartialOrd for ArtifactKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

impl FromStr for ArtifactKey {
    type Err = DepgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_segments(s)?.as_slice() {
            [g, a] => Ok(Self::new(*g, *a)),
            _ => Err(invalid(s, "expected group:artifact")),
        }
    }
}

impl Serialize for ArtifactKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArtifactKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Declared usage context of a dependency edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// No scope declared; treated like `compile`.
    #[default]
    #[serde(rename = "")]
    Unspecified,
    Compile,
    Runtime,
    Provided,
    Test,
    System,
    Import,
}

impl Scope {
    /// Whether edges of this scope are traversed into the record graph.
    #[must_use]
    pub const fn is_traversed(self) -> bool {
        matches!(self, Self::Unspecified | Self::Compile | Self::Runtime)
    }

    /// Whether a child edge of this scope belongs in the parent's runtime list.
    #[must_use]
    pub const fn is_runtime(self) -> bool {
        matches!(self, Self::Runtime)
    }

    /// The scope name as Maven spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Provided => "provided",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn split_segments(s: &str) -> Result<Vec<&str>, DepgenError> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(invalid(s, "empty segment"));
    }
    Ok(parts)
}

fn invalid(coordinate: &str, reason: &str) -> DepgenError {
    DepgenError::InvalidCoordinate {
        coordinate: coordinate.to_string(),
        reason: reason.to_string(),
    }
}
