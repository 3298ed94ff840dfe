use anyhow::Result;
use predicates::prelude::*;
use std::fs;

use crate::common::{TestProject, with_children};

#[test]
fn test_missing_config() -> Result<()> {
    let project = TestProject::new()?;
    project
        .command()
        .arg("generate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("dependencies.yml"));
    Ok(())
}

#[test]
fn test_malformed_config() -> Result<()> {
    let project = TestProject::new()?;
    fs::write(project.path().join("dependencies.yml"), "repositories: [unclosed\n")?;
    project.command().arg("hash").assert().code(2);
    Ok(())
}

#[test]
fn test_invalid_config() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config().with_yaml(
        "artifacts:\n  - coord: com.example:myapp\n  - coord: com.example:myapp:2.0\n",
    ))?;
    project.command().arg("generate").assert().code(3);
    Ok(())
}

#[test]
fn test_missing_tree() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config())?;
    project
        .command()
        .arg("generate")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("resolved-tree.json"));
    Ok(())
}

#[test]
fn test_artifact_not_in_repository() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config())?;
    let mut node = project.node("com.example:myapp:1.0")?;
    // the resolver saw a file the repository no longer serves
    let moved = project.path().join("elsewhere.jar");
    fs::rename(project.repo().path_of(&"com.example:myapp:1.0".parse()?), &moved)?;
    node["file"] = serde_json::Value::String(moved.display().to_string());
    project.write_tree(vec![node])?;

    project
        .command()
        .arg("generate")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("com.example:myapp"));
    assert!(!project.extension_file().exists());
    Ok(())
}

#[test]
fn test_fatal_resolution_problem() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config())?;
    let tree = serde_json::json!({
        "root": { "children": [with_children(project.node("com.example:myapp:1.0")?, Vec::new())] },
        "problems": [{ "coordinate": "com.example:gone:pom:1.0", "kind": "missingPom", "message": "not found" }]
    });
    fs::write(project.path().join("resolved-tree.json"), tree.to_string())?;
    project.command().arg("generate").assert().code(4);

    fs::write(
        project.path().join("dependencies.yml"),
        format!("{}  failOnMissingPom: false\n", project.config().content),
    )?;
    project.command().arg("generate").assert().success();
    Ok(())
}
