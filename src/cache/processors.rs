//! Annotation processor discovery inside a jar.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::constants::PROCESSOR_SERVICE_ENTRY;

/// Class names listed in the jar's processor service registration.
///
/// Returns `None` when the jar has no registration or it lists nothing.
pub fn read_processors(jar: &Path) -> Result<Option<Vec<String>>> {
    let file = File::open(jar).with_context(|| format!("Failed to open {}", jar.display()))?;
    let mut archive =
        ZipArchive::new(file).with_context(|| format!("Failed to read jar {}", jar.display()))?;

    let mut content = String::new();
    match archive.by_name(PROCESSOR_SERVICE_ENTRY) {
        Ok(mut entry) => {
            entry.read_to_string(&mut content).with_context(|| {
                format!("Failed to read {PROCESSOR_SERVICE_ENTRY} in {}", jar.display())
            })?;
        }
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(ZipError::Io(e)) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read jar {}", jar.display()));
        }
    }

    let processors: Vec<String> = content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    Ok(if processors.is_empty() { None } else { Some(processors) })
}
