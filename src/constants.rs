//! Global constants used throughout the generator.
//!
//! File names, cache sentinels and repository defaults live here so the
//! on-disk formats they define are easy to find.

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "dependencies.yml";

/// Default name of the resolver output document, next to the configuration.
pub const DEFAULT_TREE_FILE: &str = "resolved-tree.json";

/// Default extension file, relative to the workspace root.
pub const DEFAULT_EXTENSION_FILE: &str = "thirdparty/dependencies.bzl";

/// Name of the companion wrapper written beside the extension file.
pub const WRAPPER_FILE: &str = "BUILD.bazel";

/// Repository used when the configuration lists none.
pub const DEFAULT_REPOSITORY_NAME: &str = "central";

/// Base URL of [`DEFAULT_REPOSITORY_NAME`].
pub const DEFAULT_REPOSITORY_URL: &str = "https://repo.maven.apache.org/maven2/";

/// Name of the per-directory metadata cache file.
pub const METADATA_FILE: &str = "bazel-depgen.metadata.toml";

/// Cached value meaning "looked, found nothing".
pub const NOT_FOUND_SENTINEL: &str = "-";

/// Separator of multi-valued cache entries.
pub const VALUE_SEPARATOR: char = '|';

/// Cache key segment standing in for the empty classifier.
pub const DEFAULT_CLASSIFIER_KEY: &str = "<default>";

/// Service registration listing annotation processors inside a jar.
pub const PROCESSOR_SERVICE_ENTRY: &str = "META-INF/services/javax.annotation.processing.Processor";

/// Generator version embedded in generated file headers.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
