//! File system utilities.
//!
//! - [`atomic`] - temp-and-rename writes and write-if-absent
//! - [`dirs`] - directory creation
//! - [`metadata`] - content checksums

pub mod atomic;
pub mod dirs;
pub mod metadata;

pub use atomic::{atomic_write, safe_write, write_if_absent};
pub use dirs::ensure_dir;
pub use metadata::calculate_checksum;
