//! Test utilities for bazel-depgen
//!
//! Fixtures for building resolved trees, local Maven repositories and
//! configuration files without network access, plus logging setup for tests.
//!
//! Compiled for unit tests and, through the `test-utils` feature, for the
//! integration test suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use bazel_depgen::test_utils::{LocalRepository, init_test_logging};
//!
//! # fn example() -> anyhow::Result<()> {
//! init_test_logging(None);
//! let temp = tempfile::TempDir::new()?;
//! let repo = LocalRepository::new(temp.path().join("repository"));
//! let node = repo.artifact("com.example:myapp:1.0")?;
//! assert!(node.file.as_deref().is_some_and(|f| f.exists()));
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::{ConfigFixture, FakeProbe, LocalRepository, write_jar, write_pom};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=bazel_depgen=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
