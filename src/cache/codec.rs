//! Persistence of one metadata file.
//!
//! The file is a flat TOML table of string values. Reading never fails: a
//! missing file is empty, and an unreadable or malformed one is logged and
//! treated as empty so the cache rebuilds itself.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::utils::fs::safe_write;

/// Entries of a metadata file, ordered by encoded key.
pub type Entries = BTreeMap<String, String>;

/// Read the entries stored at `path`.
pub fn load(path: &Path) -> Entries {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Entries::new(),
        Err(e) => {
            warn!("Ignoring unreadable metadata cache {}: {e}", path.display());
            return Entries::new();
        }
    };
    match toml::from_str::<Entries>(&content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Ignoring corrupt metadata cache {}: {e}", path.display());
            Entries::new()
        }
    }
}

/// Write `entries` to `path` atomically.
pub fn store(path: &Path, entries: &Entries) -> Result<()> {
    let content = toml::to_string(entries).context("Failed to serialize metadata cache")?;
    safe_write(path, &content)
        .with_context(|| format!("Failed to write metadata cache: {}", path.display()))
}
