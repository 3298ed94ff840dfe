//! Persistent per-artifact metadata cache.
//!
//! Hashing jars, probing repositories and opening archives are deterministic
//! but slow, so their results are memoized on disk next to the artifact they
//! describe. Each directory of the local repository gets one metadata file
//! ([`METADATA_FILE`](crate::constants::METADATA_FILE)) holding a flat table of
//! facts addressed by [`CacheKey`].
//!
//! # Lifecycle
//!
//! - Files are loaded lazily, the first time a fact of that directory is needed
//! - Every new or changed fact is written back immediately
//! - A corrupt file is logged and treated as empty; it is rebuilt as facts are
//!   recomputed
//!
//! # Invalidation
//!
//! Cached URLs are only trusted while they still start with the base URL of
//! the repository they were found in. After a repository URL changes in the
//! configuration, the stale entry is discarded and recomputed on next use.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bazel_depgen::cache::{HttpProbe, MetadataCache};
//! use bazel_depgen::config::AuthContexts;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut cache = MetadataCache::new(Box::new(HttpProbe::new()?), AuthContexts::new());
//! let jar = Path::new("repository/com/example/myapp/1.0/myapp-1.0.jar");
//! let sha = cache.metadata(jar).sha256("", jar)?;
//! println!("{sha}");
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod key;
pub mod licenses;
pub mod probe;
pub mod processors;

pub use key::CacheKey;
pub use licenses::{License, LicenseClassification};
pub use probe::{HttpProbe, RepositoryProbe};

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{AuthContexts, RepositoryConfig};
use crate::constants::{METADATA_FILE, NOT_FOUND_SENTINEL, VALUE_SEPARATOR};
use crate::core::DepgenError;
use crate::model::Coordinate;
use crate::utils::fs::calculate_checksum;

/// Metadata of the artifacts stored in one directory.
#[derive(Debug)]
pub struct ArtifactMetadata {
    path: PathBuf,
    entries: Option<codec::Entries>,
}

impl ArtifactMetadata {
    /// Metadata stored in `directory`. Nothing is read until first use.
    pub fn new(directory: &Path) -> Self {
        Self {
            path: directory.join(METADATA_FILE),
            entries: None,
        }
    }

    /// Location of the metadata file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&mut self) -> &mut codec::Entries {
        self.entries.get_or_insert_with(|| codec::load(&self.path))
    }

    fn flush(&mut self) -> Result<()> {
        let path = self.path.clone();
        codec::store(&path, self.entries())
    }

    /// Cached value of `key`, if any.
    pub fn get(&mut self, key: &CacheKey) -> Option<String> {
        self.entries().get(&key.encode()).cloned()
    }

    /// Return the cached value of `key`, computing and persisting it on a miss.
    ///
    /// `compute` runs at most once per key for the lifetime of the file.
    pub fn get_or_compute<F>(&mut self, key: &CacheKey, compute: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        debug!("Computing {key} for {}", self.path.display());
        let value = compute()?;
        self.entries().insert(key.encode(), value.clone());
        self.flush()?;
        Ok(value)
    }

    /// Forget `key` and persist the removal.
    pub fn remove(&mut self, key: &CacheKey) -> Result<()> {
        if self.entries().remove(&key.encode()).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Hex sha256 of `file`, the artifact with `classifier`.
    pub fn sha256(&mut self, classifier: &str, file: &Path) -> Result<String> {
        self.get_or_compute(&CacheKey::sha256(classifier), || calculate_checksum(file))
    }

    /// URLs that serve `coordinate`, one per repository that has it, in
    /// repository order.
    ///
    /// Repositories that do not answer count as not serving the artifact. The
    /// result may be empty.
    pub fn find_urls(
        &mut self,
        coordinate: &Coordinate,
        repositories: &[RepositoryConfig],
        auth: &AuthContexts,
        probe: &dyn RepositoryProbe,
    ) -> Result<Vec<String>> {
        let mut urls = Vec::new();
        for repository in repositories {
            let key = CacheKey::url(&coordinate.classifier, &repository.name);
            if let Some(cached) = self.get(&key)
                && cached != NOT_FOUND_SENTINEL
                && !cached.starts_with(&repository.url)
            {
                debug!(
                    "Cached URL {cached} does not belong to repository {} ({}), recomputing",
                    repository.name, repository.url
                );
                self.remove(&key)?;
            }

            let value = self.get_or_compute(&key, || {
                let url = format!("{}{}", repository.url, coordinate.repository_path());
                match probe.exists(&url, auth.get(&repository.name)) {
                    Ok(true) => Ok(url),
                    Ok(false) => Ok(NOT_FOUND_SENTINEL.to_string()),
                    Err(e) => {
                        debug!("Probing {url} failed, treating as absent: {e:#}");
                        Ok(NOT_FOUND_SENTINEL.to_string())
                    }
                }
            })?;
            if value != NOT_FOUND_SENTINEL {
                urls.push(value);
            }
        }
        Ok(urls)
    }

    /// Like [`find_urls`](Self::find_urls), but an artifact no repository
    /// serves is an error.
    pub fn urls(
        &mut self,
        coordinate: &Coordinate,
        repositories: &[RepositoryConfig],
        auth: &AuthContexts,
        probe: &dyn RepositoryProbe,
    ) -> Result<Vec<String>> {
        let urls = self.find_urls(coordinate, repositories, auth, probe)?;
        if urls.is_empty() {
            return Err(DepgenError::NoRepositoryContainsArtifact {
                coordinate: coordinate.to_string(),
                repositories: repositories
                    .iter()
                    .map(|r| format!("{} ({})", r.name, r.url))
                    .collect(),
            }
            .into());
        }
        Ok(urls)
    }

    /// Annotation processors registered in `jar`, `None` when there are none.
    pub fn processors(&mut self, jar: &Path) -> Result<Option<Vec<String>>> {
        let value = self.get_or_compute(&CacheKey::Processors, || {
            Ok(match processors::read_processors(jar)? {
                Some(list) => join(list.iter().map(String::as_str)),
                None => NOT_FOUND_SENTINEL.to_string(),
            })
        })?;
        Ok(split(&value).map(|values| values.map(str::to_string).collect()))
    }

    /// Licenses declared in `pom`, `None` when it declares none.
    pub fn licenses(&mut self, pom: &Path) -> Result<Option<Vec<License>>> {
        let value = self.get_or_compute(&CacheKey::Licenses, || {
            let licenses = licenses::read_licenses(pom)?;
            Ok(if licenses.is_empty() {
                NOT_FOUND_SENTINEL.to_string()
            } else {
                let encoded: Vec<String> = licenses.iter().map(License::encode).collect();
                join(encoded.iter().map(String::as_str))
            })
        })?;
        Ok(split(&value).map(|values| values.filter_map(License::decode).collect()))
    }
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(&VALUE_SEPARATOR.to_string())
}

fn split(value: &str) -> Option<impl Iterator<Item = &str>> {
    if value == NOT_FOUND_SENTINEL {
        None
    } else {
        Some(value.split(VALUE_SEPARATOR).filter(|v| !v.is_empty()))
    }
}

/// Registry of [`ArtifactMetadata`], one per artifact directory, plus the
/// collaborators needed to compute URL facts.
pub struct MetadataCache {
    probe: Box<dyn RepositoryProbe>,
    auth: AuthContexts,
    stores: HashMap<PathBuf, ArtifactMetadata>,
}

impl MetadataCache {
    pub fn new(probe: Box<dyn RepositoryProbe>, auth: AuthContexts) -> Self {
        Self {
            probe,
            auth,
            stores: HashMap::new(),
        }
    }

    /// Metadata for the directory containing `file`.
    pub fn metadata(&mut self, file: &Path) -> &mut ArtifactMetadata {
        let directory = file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        self.stores.entry(directory.clone()).or_insert_with(|| ArtifactMetadata::new(&directory))
    }

    /// Hex sha256 of the artifact `coordinate` resolved to `file`.
    pub fn sha256(&mut self, coordinate: &Coordinate, file: &Path) -> Result<String> {
        self.metadata(file).sha256(&coordinate.classifier, file)
    }

    /// URLs serving `coordinate`; an error if none does. See [`ArtifactMetadata::urls`].
    pub fn urls(
        &mut self,
        coordinate: &Coordinate,
        file: &Path,
        repositories: &[RepositoryConfig],
    ) -> Result<Vec<String>> {
        let directory = file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let store = self
            .stores
            .entry(directory.clone())
            .or_insert_with(|| ArtifactMetadata::new(&directory));
        store.urls(coordinate, repositories, &self.auth, self.probe.as_ref())
    }

    /// URLs serving `coordinate`, possibly none. See [`ArtifactMetadata::find_urls`].
    pub fn find_urls(
        &mut self,
        coordinate: &Coordinate,
        file: &Path,
        repositories: &[RepositoryConfig],
    ) -> Result<Vec<String>> {
        let directory = file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let store = self
            .stores
            .entry(directory.clone())
            .or_insert_with(|| ArtifactMetadata::new(&directory));
        store.find_urls(coordinate, repositories, &self.auth, self.probe.as_ref())
    }

    /// Annotation processors registered in `jar`.
    pub fn processors(&mut self, jar: &Path) -> Result<Option<Vec<String>>> {
        self.metadata(jar).processors(jar)
    }

    /// Licenses declared in `pom`, cached beside `file`.
    pub fn licenses(&mut self, file: &Path, pom: &Path) -> Result<Option<Vec<License>>> {
        self.metadata(file).licenses(pom)
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("repositories_with_credentials", &self.auth.keys().collect::<Vec<_>>())
            .field("stores", &self.stores.len())
            .finish()
    }
}
