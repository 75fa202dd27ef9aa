use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use apinatomy::diagnostics::{LogCode, Status};
use apinatomy_cli::{Args, run};

/// Collects all .json files from a directory under the workspace `demos/`.
fn collect_demo_files(subdir: &str) -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(subdir);
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json")
                })
                .collect()
        })
        .unwrap_or_default();

    files.sort();
    files
}

fn args_for(input: &Path, output: &Path) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
        scale: None,
        strict: false,
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_demo_files("");
    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();
    for demo in &demos {
        let output = temp_dir
            .path()
            .join(demo.file_name().expect("demo files have names"));
        match run(&args_for(demo, &output)) {
            Ok(model) => {
                if model.status() == Status::Error {
                    failed.push((demo.clone(), format!("{:?}", model.diagnostics().entries())));
                    continue;
                }
                let written = fs::read_to_string(&output).expect("output is written");
                let doc: serde_json::Value =
                    serde_json::from_str(&written).expect("output is valid JSON");
                assert_eq!(doc["id"], model.graph().id().to_string());
            }
            Err(err) => failed.push((demo.clone(), err.to_string())),
        }
    }

    if !failed.is_empty() {
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_demo_files("errors");
    assert!(!demos.is_empty(), "No error demos found in demos/errors/");

    for demo in &demos {
        let output = temp_dir.path().join("out.json");
        let result = run(&args_for(demo, &output));
        assert!(result.is_err(), "{} should fail to build", demo.display());
        assert!(!output.exists(), "{} should not write output", demo.display());
    }
}

#[test]
fn e2e_housed_chain_is_embedded() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demo = collect_demo_files("")
        .into_iter()
        .find(|path| path.ends_with("housed_chain.json"))
        .expect("housed chain demo exists");
    let output = temp_dir.path().join("housed.json");

    let model = run(&args_for(&demo, &output)).expect("demo builds");
    assert!(model.diagnostics().with_code(LogCode::CoalescenceNoLyph).next().is_none());

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let chain = &doc["chains"][0];
    assert_eq!(chain["id"], "Axon");
    assert_eq!(chain["levels"].as_array().unwrap().len(), 2);
    let embedding = doc["coalescences"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|clsn| clsn["topology"] == "EMBEDDING")
        .count();
    assert_eq!(embedding, 2);
}

#[test]
fn e2e_scale_applies_to_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("model.json");
    fs::write(&input, r#"{"lyphs": [{"id": "L", "width": 3}]}"#).unwrap();
    let output = temp_dir.path().join("out.json");

    let mut args = args_for(&input, &output);
    args.scale = Some(2.0);
    run(&args).expect("model builds");

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["lyphs"][0]["width"], 6.0);
}
