//! License extraction from POM files and classification for Bazel's
//! `licenses` attribute.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::core::DepgenError;

/// Bazel license classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseClassification {
    Restricted,
    Reciprocal,
    Notice,
    Permissive,
    Unencumbered,
    ByExceptionOnly,
    /// Declared but not recognized; never emitted
    Unknown,
}

impl LicenseClassification {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Restricted => "restricted",
            Self::Reciprocal => "reciprocal",
            Self::Notice => "notice",
            Self::Permissive => "permissive",
            Self::Unencumbered => "unencumbered",
            Self::ByExceptionOnly => "by_exception_only",
            Self::Unknown => "unknown",
        }
    }

    /// Classify a license from its declared name and URL.
    #[must_use]
    pub fn classify(name: &str, url: Option<&str>) -> Self {
        let text = format!("{} {}", name, url.unwrap_or_default()).to_lowercase();
        let words: Vec<&str> =
            text.split(|c: char| !c.is_ascii_alphanumeric()).filter(|w| !w.is_empty()).collect();
        let has_word = |w: &str| words.contains(&w);
        let has = |s: &str| text.contains(s);

        if has("eclipse distribution") || has_word("edl") {
            Self::Notice
        } else if has("general public") || has_word("gpl") || has_word("lgpl") || has_word("agpl")
        {
            Self::Restricted
        } else if has("eclipse public")
            || has_word("epl")
            || has("mozilla")
            || has_word("mpl")
            || has("common development and distribution")
            || has_word("cddl")
            || has("common public")
        {
            Self::Reciprocal
        } else if has("public domain") || has_word("cc0") || has("unlicense") {
            Self::Unencumbered
        } else if has("apache")
            || has_word("mit")
            || has_word("bsd")
            || has_word("isc")
            || has_word("zlib")
            || has("boost")
            || has("bouncy castle")
            || has_word("json")
        {
            Self::Notice
        } else if has_word("wtfpl") {
            Self::Permissive
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for LicenseClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseClassification {
    type Err = DepgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restricted" => Ok(Self::Restricted),
            "reciprocal" => Ok(Self::Reciprocal),
            "notice" => Ok(Self::Notice),
            "permissive" => Ok(Self::Permissive),
            "unencumbered" => Ok(Self::Unencumbered),
            "by_exception_only" => Ok(Self::ByExceptionOnly),
            "unknown" => Ok(Self::Unknown),
            other => Err(DepgenError::Other {
                message: format!("Unknown license classification '{other}'"),
            }),
        }
    }
}

/// A license declared in a POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub classification: LicenseClassification,
    pub name: String,
}

impl License {
    /// `classification:name`, the cached form. `|` is reserved as the value separator.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}:{}", self.classification, self.name.replace('|', "/"))
    }

    /// Parse the cached form.
    pub fn decode(text: &str) -> Option<Self> {
        let (classification, name) = text.split_once(':')?;
        Some(Self {
            classification: classification.parse().ok()?,
            name: name.to_string(),
        })
    }
}

/// Licenses declared in the `<licenses>` section of a POM.
pub fn read_licenses(pom: &Path) -> Result<Vec<License>> {
    let content =
        fs::read_to_string(pom).with_context(|| format!("Failed to read POM {}", pom.display()))?;
    let doc = roxmltree::Document::parse(&content)
        .with_context(|| format!("Failed to parse POM {}", pom.display()))?;

    let project = doc.root_element();
    let Some(licenses) = child_element(project, "licenses") else {
        return Ok(Vec::new());
    };

    Ok(licenses
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "license")
        .filter_map(|license| {
            let name = child_text(license, "name");
            let url = child_text(license, "url");
            let label = name.clone().or_else(|| url.clone())?;
            Some(License {
                classification: LicenseClassification::classify(&label, url.as_deref()),
                name: label,
            })
        })
        .collect())
}

fn child_element<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| n.is_element() && n.tag_name().name() == name)
}

fn child_text(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    child_element(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
