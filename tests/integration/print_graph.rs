use anyhow::Result;

use crate::common::{TestProject, with_children, with_scope};

#[test]
fn test_print_graph() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config().with_yaml("artifacts:\n  - coord: com.example:myapp\n"))?;
    project.write_tree(vec![with_children(
        project.node("com.example:myapp:1.0")?,
        vec![
            with_children(
                project.node("com.example:mylib:1.0")?,
                vec![with_scope(project.node("com.example:rtB:2.0")?, "runtime")],
            ),
            with_scope(project.node("com.example:rtA:33.0")?, "runtime"),
        ],
    )])?;

    project.command().arg("print-graph").assert().success().stdout(
        "└── com.example:myapp:1.0 (declared)\n    ├── com.example:mylib:1.0\n    │   └── com.example:rtB:2.0 [runtime]\n    └── com.example:rtA:33.0 [runtime]\n",
    );
    assert!(!project.extension_file().exists());
    Ok(())
}

#[test]
fn test_print_empty_graph() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config())?;
    project.write_tree(Vec::new())?;

    project.command().arg("print-graph").assert().success().stdout("No dependencies\n");
    Ok(())
}
