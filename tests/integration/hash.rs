use anyhow::Result;
use bazel_depgen::config::ApplicationConfig;
use std::fs;

use crate::common::TestProject;

#[test]
fn test_hash_matches_library() -> Result<()> {
    let project = TestProject::new()?;
    let path = project.write_config(&project.config())?;
    let expected = ApplicationConfig::load(&path)?.config_sha256()?;

    project.command().arg("hash").assert().success().stdout(format!("{expected}\n"));
    Ok(())
}

#[test]
fn test_hash_ignores_formatting() -> Result<()> {
    let project = TestProject::new()?;
    let fixture = project.config();
    project.write_config(&fixture)?;
    let first = project.command().arg("hash").output()?.stdout;

    let reformatted = format!("# comment\n\n{}", fixture.content.replace(": ", ":   "));
    fs::write(project.path().join("dependencies.yml"), reformatted)?;
    let second = project.command().arg("hash").output()?.stdout;
    assert_eq!(first, second);

    fs::write(
        project.path().join("dependencies.yml"),
        format!("{}  exportDeps: true\n", fixture.content),
    )?;
    let third = project.command().arg("hash").output()?.stdout;
    assert_ne!(first, third);
    Ok(())
}
