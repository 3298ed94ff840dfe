//! Utility functions shared by the generator stages.

pub mod fs;

pub use fs::{atomic_write, calculate_checksum, ensure_dir, safe_write, write_if_absent};
