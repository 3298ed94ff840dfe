//! File content hashing.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// Hex SHA-256 of a file's content.
///
/// The file is streamed through the hasher so large jars are not held in memory.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let mut file = fs::File::open(path)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    Ok(hex::encode(hasher.finalize()))
}
