//! Semantic validation of a parsed [`ApplicationConfig`].
//!
//! Checks run in a fixed order and stop at the first failure. Each failure is a
//! [`DepgenError::InvalidConfig`] carrying the YAML of the entry at fault.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

use super::{ApplicationConfig, RepositoryConfig};
use crate::core::DepgenError;
use crate::model::ArtifactKey;

/// Validate `config` and normalize repository URLs.
pub fn validate(config: &mut ApplicationConfig) -> Result<()> {
    validate_repositories(&config.repositories)?;
    for repository in &mut config.repositories {
        if !repository.url.ends_with('/') {
            repository.url.push('/');
        }
    }

    let mut artifacts = HashSet::new();
    for artifact in &config.artifacts {
        if !artifacts.insert(&artifact.coord.key) {
            return Err(invalid(
                format!("artifact {} is declared more than once", artifact.coord.key),
                artifact,
            ));
        }
        let mut natures = HashSet::new();
        if let Some(nature) = artifact.natures.iter().find(|n| !natures.insert(**n)) {
            return Err(invalid(
                format!("nature {nature} is listed twice for {}", artifact.coord.key),
                artifact,
            ));
        }
        if let Some(j2cl) = &artifact.j2cl
            && j2cl.suppress.iter().any(|s| s.trim().is_empty())
        {
            return Err(invalid(
                format!("empty j2cl suppression for {}", artifact.coord.key),
                artifact,
            ));
        }
    }

    let mut replacements = HashSet::new();
    for replacement in &config.replacements {
        if !replacements.insert(&replacement.coord) {
            return Err(invalid(
                format!("replacement for {} is declared more than once", replacement.coord),
                replacement,
            ));
        }
        if replacement.target.trim().is_empty() {
            return Err(invalid(
                format!("replacement for {} has an empty target", replacement.coord),
                replacement,
            ));
        }
        if artifacts.contains(&replacement.coord) {
            return Err(invalid(
                format!("{} is both a declared artifact and a replacement", replacement.coord),
                replacement,
            ));
        }
    }

    let mut excludes: HashSet<&ArtifactKey> = HashSet::new();
    for exclude in &config.excludes {
        if !excludes.insert(&exclude.coord) {
            return Err(invalid(
                format!("exclude {} is declared more than once", exclude.coord),
                exclude,
            ));
        }
        if artifacts.contains(&exclude.coord) {
            return Err(invalid(
                format!("{} is both a declared artifact and a global exclude", exclude.coord),
                exclude,
            ));
        }
    }

    Ok(())
}

fn validate_repositories(repositories: &[RepositoryConfig]) -> Result<()> {
    if repositories.is_empty() {
        return Err(DepgenError::InvalidConfig {
            reason: "at least one repository must be configured".to_string(),
            fragment: "repositories: []".to_string(),
        }
        .into());
    }
    let mut names = HashSet::new();
    for repository in repositories {
        if repository.name.trim().is_empty() {
            return Err(invalid("repository with an empty name", repository));
        }
        if repository.url.trim().is_empty() {
            return Err(invalid(
                format!("repository {} has an empty url", repository.name),
                repository,
            ));
        }
        if !names.insert(repository.name.as_str()) {
            return Err(invalid(
                format!("repository {} is declared more than once", repository.name),
                repository,
            ));
        }
    }
    Ok(())
}

fn invalid(reason: impl Into<String>, fragment: &impl Serialize) -> anyhow::Error {
    DepgenError::InvalidConfig {
        reason: reason.into(),
        fragment: serde_yaml::to_string(fragment)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    }
    .into()
}
