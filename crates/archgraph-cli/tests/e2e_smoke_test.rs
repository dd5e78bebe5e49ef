use std::{fs, path::PathBuf};

use tempfile::tempdir;

use archgraph::ArchgraphError;
use archgraph_cli::{Args, run};

/// Collects all .json inputs from the workspace demos directory
fn collect_demo_inputs() -> Vec<PathBuf> {
    // Demos are at workspace root, relative to workspace not the crate
    let demos_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos");

    let mut files: Vec<PathBuf> = if let Ok(entries) = fs::read_dir(&demos_path) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

fn args(input: &PathBuf, output: &PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        strategy: None,
        compact: false,
        log_level: "off".to_string(),
    }
}

fn read_json(path: &PathBuf) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn e2e_smoke_test_demo_inputs() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let demos = collect_demo_inputs();
    assert!(!demos.is_empty(), "No demo inputs found in demos/");

    for strategy in ["hierarchical", "circular", "force_directed", "grid", "layered"] {
        for demo in &demos {
            let output_path = temp_dir.path().join(format!(
                "{}-{strategy}.json",
                demo.file_stem().unwrap().to_string_lossy()
            ));
            let mut args = args(demo, &output_path);
            args.strategy = Some(strategy.to_string());

            if let Err(err) = run(&args) {
                panic!("{} failed with {strategy}: {err}", demo.display());
            }

            let value = read_json(&output_path);
            let diagrams = value["diagrams"].as_array().unwrap();
            assert!(!diagrams.is_empty());
            for view in diagrams {
                assert_eq!(view["report"]["layout"]["strategy"], strategy);
                for element in view["diagram"]["elements"].as_array().unwrap() {
                    let x = element["position"]["x"].as_f64().unwrap();
                    let y = element["position"]["y"].as_f64().unwrap();
                    assert!((50.0..=1150.0).contains(&x), "x out of canvas: {x}");
                    assert!((50.0..=750.0).contains(&y), "y out of canvas: {y}");
                }
            }
        }
    }
}

#[test]
fn e2e_config_file_is_applied() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demo = collect_demo_inputs().remove(0);
    let output_path = temp_dir.path().join("out.json");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[optimizer]\nlayout_strategy = \"grid\"\n\n[views]\nlevels = [\"component\"]\n",
    )
    .unwrap();

    let mut args = args(&demo, &output_path);
    args.config = Some(config_path.to_string_lossy().to_string());
    args.compact = true;
    run(&args).unwrap();

    let content = fs::read_to_string(&output_path).unwrap();
    assert!(!content.contains('\n'));
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let diagrams = value["diagrams"].as_array().unwrap();
    assert_eq!(diagrams.len(), 1);
    assert_eq!(diagrams[0]["diagram"]["level"], "component");
    assert_eq!(diagrams[0]["report"]["layout"]["strategy"], "grid");
}

#[test]
fn e2e_errors() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demo = collect_demo_inputs().remove(0);
    let output_path = temp_dir.path().join("out.json");

    let mut missing_config = args(&demo, &output_path);
    missing_config.config = Some(temp_dir.path().join("absent.toml").to_string_lossy().to_string());
    assert!(matches!(run(&missing_config), Err(ArchgraphError::Config(_))));

    let mut bad_strategy = args(&demo, &output_path);
    bad_strategy.strategy = Some("spiral".to_string());
    assert!(matches!(run(&bad_strategy), Err(ArchgraphError::Config(_))));

    let missing_input = args(&temp_dir.path().join("absent.json"), &output_path);
    assert!(matches!(run(&missing_input), Err(ArchgraphError::Io(_))));

    let malformed = temp_dir.path().join("malformed.json");
    fs::write(&malformed, "{ not json").unwrap();
    assert!(matches!(
        run(&args(&malformed, &output_path)),
        Err(ArchgraphError::Config(_))
    ));

    assert!(!output_path.exists());
}
