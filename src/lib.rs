//! bazel-depgen - Bazel rules from resolved Maven dependency trees
//!
//! Turns the dependency tree produced by a Maven resolver into deterministic
//! Bazel declarations: an `http_file` per artifact plus `java_import`,
//! `java_plugin`, `java_library`, `j2cl_library` and `alias` targets, written
//! to a generated extension file that a hand-editable `BUILD.bazel` loads.
//!
//! # Architecture Overview
//!
//! A generation run moves through four stages:
//!
//! 1. **Selection** ([`selector`]) decides which edges of the tree are
//!    followed: test and provided scopes, optional dependencies, excludes and
//!    replacements all truncate the tree.
//! 2. **Collection** ([`collector`]) walks the pruned tree and materializes one
//!    record per `group:artifact` holding the winning version, its hash, the
//!    URLs serving it and its compile and runtime children.
//! 3. **Caching** ([`cache`]) memoizes hashes, URLs, annotation processors and
//!    licenses in a small file next to each artifact so that repeated runs do
//!    no network or hashing work.
//! 4. **Emission** ([`emitter`]) renders the record graph into build files.
//!
//! # Core Modules
//!
//! - [`cli`] - `generate`, `print-graph` and `hash` commands
//! - [`config`] - `dependencies.yml` parsing and validation
//! - [`core`] - error types and exit codes
//! - [`model`] - coordinates, tree nodes and the resolver's tree document
//! - [`utils`] - atomic file writes and checksums
//!
//! # Example
//!
//! ```rust,no_run
//! use bazel_depgen::cache::{HttpProbe, MetadataCache};
//! use bazel_depgen::collector::ApplicationRecord;
//! use bazel_depgen::config::{ApplicationConfig, AuthContexts};
//! use bazel_depgen::emitter::Generator;
//! use bazel_depgen::model::ResolvedTree;
//! use bazel_depgen::selector::{SelectorChain, prune};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ApplicationConfig::load(Path::new("dependencies.yml"))?;
//! let tree = ResolvedTree::load(Path::new("resolved-tree.json"))?;
//! let mut cache = MetadataCache::new(Box::new(HttpProbe::new()?), AuthContexts::new());
//!
//! let pruned = prune(&tree.root, &SelectorChain::for_config(&config));
//! let graph = ApplicationRecord::build(&pruned, &config, &mut cache)?;
//! Generator::new(&config, &graph)?.generate(&mut cache)?.write()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod collector;
pub mod config;
pub mod constants;
pub mod core;
pub mod emitter;
pub mod model;
pub mod selector;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
