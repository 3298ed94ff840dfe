//! Shared helpers for integration tests.

use anyhow::Result;
use assert_cmd::Command;
use bazel_depgen::constants::{DEFAULT_TREE_FILE, WRAPPER_FILE};
use bazel_depgen::test_utils::{ConfigFixture, LocalRepository, init_test_logging};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory with a configuration, a resolved tree and a local
/// repository holding the artifacts the tree points at.
pub struct TestProject {
    temp: TempDir,
    repo: LocalRepository,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        init_test_logging(None);
        let temp = TempDir::new()?;
        let repo = LocalRepository::new(temp.path().join("repository"));
        fs::create_dir_all(repo.root())?;
        Ok(Self {
            temp,
            repo,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn repo(&self) -> &LocalRepository {
        &self.repo
    }

    /// Configuration serving artifacts from the local repository.
    pub fn config(&self) -> ConfigFixture {
        ConfigFixture::basic(&self.repo.url())
    }

    pub fn write_config(&self, fixture: &ConfigFixture) -> Result<PathBuf> {
        fixture.write_to(self.path())
    }

    /// Install `coordinate` in the repository and describe it as a tree node.
    pub fn node(&self, coordinate: &str) -> Result<Value> {
        let node = self.repo.artifact(coordinate)?;
        Ok(json!({
            "coordinate": coordinate,
            "file": node.file,
            "pomFile": node.pom_file,
        }))
    }

    /// Write the tree document with `children` under the root.
    pub fn write_tree(&self, children: Vec<Value>) -> Result<PathBuf> {
        let path = self.path().join(DEFAULT_TREE_FILE);
        let document = json!({ "root": { "children": children } });
        fs::write(&path, serde_json::to_string_pretty(&document)?)?;
        Ok(path)
    }

    pub fn workspace(&self) -> PathBuf {
        self.path().join("workspace")
    }

    pub fn extension_file(&self) -> PathBuf {
        self.workspace().join("thirdparty/dependencies.bzl")
    }

    pub fn wrapper_file(&self) -> PathBuf {
        self.workspace().join("thirdparty").join(WRAPPER_FILE)
    }

    /// The binary, run from the project directory.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("bazel-depgen").expect("binary is built");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("BAZEL_DEPGEN_CONFIG")
            .env("NO_COLOR", "1");
        cmd
    }
}

/// Attach children to a node.
pub fn with_children(mut node: Value, children: Vec<Value>) -> Value {
    node["children"] = Value::Array(children);
    node
}

/// Set a node's scope.
pub fn with_scope(mut node: Value, scope: &str) -> Value {
    node["scope"] = Value::String(scope.to_string());
    node
}
