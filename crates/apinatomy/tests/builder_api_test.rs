//! Integration tests for the ModelBuilder API

use serde_json::{Value, json};

use apinatomy::{
    ApinatomyError, ModelBuilder,
    config::{AppConfig, BuildConfig, ExportConfig},
    diagnostics::{LogCode, Status},
    identifier::Id,
};

#[test]
fn test_build_simple_model() {
    let source = r#"{"id": "g", "lyphs": [{"id": "L1", "name": "Wall"}]}"#;
    let result = ModelBuilder::default().build(source);
    assert!(result.is_ok(), "Should build valid model: {:?}", result.err());

    let model = result.unwrap();
    assert_eq!(model.graph().id(), Id::new("g"));
    assert_eq!(model.status(), Status::Ok);
}

#[test]
fn test_build_invalid_json_returns_error() {
    let result = ModelBuilder::default().build("{\"lyphs\": [");
    match result {
        Err(ApinatomyError::Model { src, .. }) => assert_eq!(src, "{\"lyphs\": ["),
        other => panic!("expected a model error, got {other:?}"),
    }
}

#[test]
fn test_build_reports_diagnostics() {
    let source = r#"{
        "links": [
            {"id": "l1", "source": "a", "target": "b", "conveyingLyph": "X"},
            {"id": "l2", "source": "b", "target": "c", "conveyingLyph": "X"}
        ],
        "lyphs": [{"id": "X"}]
    }"#;
    let model = ModelBuilder::default().build(source).unwrap();
    assert_eq!(model.status(), Status::Error);
    assert_eq!(model.diagnostics().with_code(LogCode::LyphConveyedTwice).count(), 1);
}

#[test]
fn test_builder_with_config() {
    let config = AppConfig::new(
        BuildConfig::default().with_length_scale(1.0),
        ExportConfig::new(false, true, false),
    );
    let builder = ModelBuilder::new(config);
    let model = builder
        .build(r#"{"links": [{"id": "l1", "source": "a", "target": "b", "length": 5}]}"#)
        .unwrap();
    let link = model.graph().registry().link(Id::new("l1")).unwrap();
    assert_eq!(link.length, Some(5.0));

    let output = builder.export_json(&model).unwrap();
    let doc: Value = serde_json::from_str(&output).unwrap();
    assert!(doc.get("diagnostics").is_none());
}

#[test]
fn test_build_value_and_edit() {
    let builder = ModelBuilder::default();
    let mut model = builder
        .build_value(json!({"lyphs": [{"id": "L", "layers": ["L1"]}, {"id": "L1"}]}))
        .unwrap();
    let layer = model
        .graph_mut()
        .create_related_resource(Id::new("L"), "layers", json!({"id": "L2"}))
        .map_err(ApinatomyError::from);
    assert!(layer.is_ok(), "Should create a layer: {:?}", layer.err());

    let lyph = model.graph().registry().lyph(Id::new("L")).unwrap();
    assert_eq!(lyph.layers, vec![Id::new("L1"), Id::new("L2")]);
}

#[test]
fn test_write_json_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    let builder = ModelBuilder::default();
    let model = builder
        .build(r#"{"id": "demo", "chains": [{"id": "C1", "numLevels": 2}]}"#)
        .unwrap();
    builder.write_json(&model, &path).unwrap();

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["id"], "demo");
    assert_eq!(doc["chains"][0]["id"], "C1");
    assert_eq!(doc["chains"][0]["levels"].as_array().unwrap().len(), 2);
}

#[test]
fn test_build_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ModelBuilder::default().build_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(ApinatomyError::Io(_))));
}
