//! Typed keys of the metadata cache.
//!
//! Every fact has exactly one key and every key has exactly one encoding in the
//! persisted file, so two facts can never collide on the same string.

use std::fmt;

use crate::constants::DEFAULT_CLASSIFIER_KEY;

/// A fact stored in an artifact's metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Hex sha256 of the artifact with `classifier`
    Sha256 {
        classifier: String,
    },
    /// URL the artifact with `classifier` is served from by `repository`
    Url {
        classifier: String,
        repository: String,
    },
    /// Annotation processors registered in the artifact
    Processors,
    /// Licenses declared in the artifact's POM
    Licenses,
}

impl CacheKey {
    pub fn sha256(classifier: &str) -> Self {
        Self::Sha256 {
            classifier: classifier.to_string(),
        }
    }

    pub fn url(classifier: &str, repository: &str) -> Self {
        Self::Url {
            classifier: classifier.to_string(),
            repository: repository.to_string(),
        }
    }

    /// Encoded form used in the metadata file.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Sha256 {
                classifier,
            } => format!("{}.sha256", classifier_segment(classifier)),
            Self::Url {
                classifier,
                repository,
            } => format!("{}.{repository}.url", classifier_segment(classifier)),
            Self::Processors => "processors".to_string(),
            Self::Licenses => "licenses".to_string(),
        }
    }
}

fn classifier_segment(classifier: &str) -> &str {
    if classifier.is_empty() { DEFAULT_CLASSIFIER_KEY } else { classifier }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
