use anyhow::Result;
use bazel_depgen::cache::{HttpProbe, MetadataCache};
use bazel_depgen::collector::ApplicationRecord;
use bazel_depgen::config::{ApplicationConfig, AuthContexts};
use bazel_depgen::emitter::Generator;
use bazel_depgen::model::ResolvedTree;
use bazel_depgen::selector::{SelectorChain, prune};
use pretty_assertions::assert_eq;

use crate::common::{TestProject, with_children, with_scope};

fn collect(project: &TestProject) -> Result<(ApplicationConfig, ApplicationRecord, MetadataCache)> {
    let config = ApplicationConfig::load(&project.path().join("dependencies.yml"))?;
    let tree = ResolvedTree::load(&project.path().join("resolved-tree.json"))?;
    let mut cache = MetadataCache::new(Box::new(HttpProbe::new()?), AuthContexts::new());
    let pruned = prune(&tree.root, &SelectorChain::for_config(&config));
    let graph = ApplicationRecord::build(&pruned, &config, &mut cache)?;
    Ok((config, graph, cache))
}

#[test]
fn test_collects_graph_through_selectors() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config().with_yaml(
        r#"artifacts:
  - coord: com.example:myapp:1.0
excludes:
  - coord: com.example:banned
replacements:
  - coord: com.example:mylib
    target: "//third_party/mylib"
"#,
    ))?;
    project.write_tree(vec![with_children(
        project.node("com.example:myapp:1.0")?,
        vec![
            with_children(
                project.node("com.example:mylib:1.0")?,
                vec![with_scope(project.node("com.example:rtB:2.0")?, "runtime")],
            ),
            with_scope(project.node("com.example:rtA:33.0")?, "runtime"),
            project.node("com.example:banned:1.0")?,
            with_scope(project.node("junit:junit:4.13")?, "test"),
        ],
    )])?;

    let (_, graph, _) = collect(&project)?;

    let keys: Vec<String> = graph.records().map(|r| r.key().to_string()).collect();
    // test scope and excluded edges produce no records
    assert_eq!(keys, vec!["com.example:myapp", "com.example:mylib", "com.example:rtA"]);
    let mylib = graph.find_by_key("com.example", "mylib").unwrap();
    assert!(mylib.is_replacement());
    assert!(mylib.sha256().is_none());
    assert!(mylib.compile_deps().is_empty());

    let myapp = graph.find_by_key("com.example", "myapp").unwrap();
    assert!(myapp.config().is_some());
    assert_eq!(
        myapp.urls(),
        [format!("{}com/example/myapp/1.0/myapp-1.0.jar", project.repo().url())]
    );
    assert_eq!(
        graph.to_tree_string(),
        "└── com.example:myapp:1.0 (declared)\n    ├── com.example:mylib:1.0 -> //third_party/mylib\n    └── com.example:rtA:33.0 [runtime]\n"
    );
    Ok(())
}

#[test]
fn test_metadata_is_cached_beside_artifacts() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config())?;
    project.write_tree(vec![project.node("com.example:myapp:1.0")?])?;

    let (_, graph, _) = collect(&project)?;
    let record = graph.find_by_key("com.example", "myapp").unwrap();
    let metadata = record.file().unwrap().parent().unwrap().join("bazel-depgen.metadata.toml");
    let content = std::fs::read_to_string(metadata)?;
    assert!(content.contains(record.sha256().unwrap()));
    assert!(content.contains("local.url"));
    Ok(())
}

#[test]
fn test_generated_extension_is_stable() -> Result<()> {
    let project = TestProject::new()?;
    project.write_config(&project.config())?;
    project.write_tree(vec![with_children(
        project.node("com.example:myapp:1.0")?,
        vec![project.node("com.example:mylib:1.0")?],
    )])?;

    let (config, graph, mut cache) = collect(&project)?;
    let generator = Generator::new(&config, &graph)?;
    let first = generator.render_extension(&mut cache)?;

    // a fresh cache reads everything back from disk
    let (config, graph, mut cache) = collect(&project)?;
    let second = Generator::new(&config, &graph)?.render_extension(&mut cache)?;
    assert_eq!(first, second);
    assert!(first.contains("deps = [\":com_example__mylib\"]"));
    Ok(())
}
