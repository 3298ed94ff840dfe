use anyhow::Result;
use predicates::prelude::*;
use std::fs;

use crate::common::{TestProject, with_children, with_scope};

fn project() -> Result<TestProject> {
    let project = TestProject::new()?;
    project.write_config(&project.config())?;
    project.write_tree(vec![with_children(
        project.node("com.example:myapp:1.0")?,
        vec![
            project.node("com.example:mylib:1.0")?,
            with_scope(project.node("com.example:rtA:33.0")?, "runtime"),
        ],
    )])?;
    Ok(project)
}

#[test]
fn test_generate_writes_extension_and_wrapper() -> Result<()> {
    let project = project()?;

    project
        .command()
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated rules for 3 artifacts"));

    let extension = fs::read_to_string(project.extension_file())?;
    assert!(extension.starts_with("# DO NOT EDIT: File is auto-generated from dependencies.yml"));
    assert!(extension.contains(&format!(
        "urls = [\"{}com/example/myapp/1.0/myapp-1.0.jar\"]",
        project.repo().url()
    )));
    assert!(extension.contains("    java_import(\n        name = \"com_example__myapp__1_0\",\n"));
    assert!(extension.contains("runtime_deps = [\":com_example__rta\"]"));

    let wrapper = fs::read_to_string(project.wrapper_file())?;
    assert!(wrapper.contains("load(\"//thirdparty:dependencies.bzl\", \"generate_targets\")"));
    assert!(wrapper.contains("generate_targets()"));
    Ok(())
}

#[test]
fn test_generate_twice_is_byte_identical() -> Result<()> {
    let project = project()?;

    project.command().arg("generate").assert().success();
    let first = fs::read(project.extension_file())?;
    project.command().arg("generate").assert().success();
    let second = fs::read(project.extension_file())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_existing_wrapper_is_kept() -> Result<()> {
    let project = project()?;
    fs::create_dir_all(project.wrapper_file().parent().unwrap())?;
    fs::write(project.wrapper_file(), "# hand written\n")?;

    project
        .command()
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kept"));

    assert_eq!(fs::read_to_string(project.wrapper_file())?, "# hand written\n");
    assert!(project.extension_file().exists());
    Ok(())
}

#[test]
fn test_quiet_generate_prints_nothing() -> Result<()> {
    let project = project()?;
    project.command().args(["--quiet", "generate"]).assert().success().stdout("");
    assert!(project.extension_file().exists());
    Ok(())
}

#[test]
fn test_explicit_paths() -> Result<()> {
    let project = TestProject::new()?;
    let conf = project.path().join("conf");
    let config = project.config().write_to(&conf)?;
    let tree = project.write_tree(vec![project.node("com.example:myapp:1.0")?])?;

    project
        .command()
        .arg("--config-file")
        .arg(&config)
        .arg("--tree")
        .arg(&tree)
        .arg("generate")
        .assert()
        .success();

    assert!(conf.join("workspace/thirdparty/dependencies.bzl").exists());
    Ok(())
}
