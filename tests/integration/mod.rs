//! Integration test suite for bazel-depgen
//!
//! End-to-end tests running the library pipeline and the `bazel-depgen`
//! binary against a Maven-layout repository in a temporary directory, served
//! through a `file://` URL so no network access is needed.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline**: config, tree, selectors, collector and emitter wired together
//! - **generate**: the `generate` command and wrapper preservation
//! - **print_graph**: the `print-graph` command
//! - **hash**: the `hash` command
//! - **errors**: exit codes for failing runs

mod common;

mod errors;
mod generate;
mod hash;
mod pipeline;
mod print_graph;
